#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use crud_harness::{
        harness_test, intercept, interceptor, mock, Agent, AgentBuilder, CannedResponse, Error,
        HarnessConfiguration, HttpClient, Method, RequestConfig, RequestData, ReqwestHttpClient,
        ResponseData, StubServer,
    };
    use regex::Regex;
    use serde_json::json;
    use std::{
        collections::HashMap,
        net::TcpListener,
        sync::{Arc, Mutex},
    };

    const VERBS: [Method; 4] = [Method::GET, Method::POST, Method::PUT, Method::DELETE];

    fn configure_harness(config: &mut HarnessConfiguration) {
        config.set_fail_on_pending_interceptors(true);
        config.add_interceptors("http://configured.test", |interceptors| {
            interceptors.reply(
                Method::GET,
                "/",
                CannedResponse::json(200, json!([{ "main_key": "k", "value": "v" }])),
            )
        });
    }

    fn debug_logging(config: &mut HarnessConfiguration) {
        config.set_log_filter("crud_harness=debug");
    }

    async fn redirecting_stub() -> StubServer {
        let stub = StubServer::start().await.unwrap();
        stub.scope()
            .get("/")
            .reply(CannedResponse::new(302).with_header("Location", "/moved"))
            .unwrap();
        stub.scope()
            .get("/moved")
            .reply(CannedResponse::json(200, json!({ "moved": true })))
            .unwrap();
        stub
    }

    fn closed_port_endpoint() -> String {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        format!("http://127.0.0.1:{}", port)
    }

    #[tokio::test]
    async fn expected_status_fails_if_and_only_if_it_differs() {
        let stub = StubServer::start().await.unwrap();
        let agent = Agent::new(stub.uri());

        for verb in VERBS.iter() {
            for expected in [201u16, 204, 400].iter() {
                stub.scope()
                    .method(verb.clone(), "/")
                    .times(2)
                    .reply(CannedResponse::new(201))
                    .unwrap();

                let matching = agent
                    .send(verb.clone(), RequestConfig::new("/").expect_status(201))
                    .await;
                assert!(matching.is_ok(), "{} with expected 201", verb);

                let result = agent
                    .send(verb.clone(), RequestConfig::new("/").expect_status(*expected))
                    .await;
                match result {
                    Ok(response) => assert_eq!(response.status_code, *expected),
                    Err(Error::UnexpectedStatus {
                        expected: reported,
                        actual,
                        response,
                    }) => {
                        assert_ne!(*expected, 201);
                        assert_eq!(reported, *expected);
                        assert_eq!(actual, 201);
                        assert_eq!(response.status_code, 201);
                    }
                    Err(e) => panic!("unexpected error for {}: {}", verb, e),
                }
            }
        }

        assert!(stub.pending().unwrap().is_empty());
        stub.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn without_expected_status_any_response_is_returned() {
        let stub = StubServer::start().await.unwrap();
        stub.scope()
            .delete("/")
            .reply(mock::server_error_response())
            .unwrap();

        let response = Agent::new(stub.uri())
            .delete(RequestConfig::new("/"))
            .await
            .unwrap();

        assert!(response.is_server_error());
        assert_eq!(response.json().unwrap()["message"], "Internal Server Error");
    }

    #[tokio::test]
    async fn headers_and_body_reach_the_server() {
        let stub = StubServer::start().await.unwrap();
        let mut headers = HashMap::new();
        headers.insert("X-Request-Id", "42");
        headers.insert("Accept", "application/json");

        Agent::new(stub.uri())
            .post(
                RequestConfig::new("/")
                    .json(&json!({ "main_key": "Ocicat", "value": "Kellie Lind Updated" }))
                    .headers(headers),
            )
            .await
            .unwrap();

        let requests = stub.received_requests().unwrap();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].method, Method::POST);
        assert_eq!(requests[0].header("x-request-id"), Some("42"));
        assert_eq!(requests[0].header("ACCEPT"), Some("application/json"));
        assert_eq!(requests[0].header("content-type"), Some("application/json"));
        assert_eq!(
            serde_json::from_str::<serde_json::Value>(&requests[0].body).unwrap(),
            json!({ "main_key": "Ocicat", "value": "Kellie Lind Updated" })
        );
    }

    #[tokio::test]
    async fn query_string_is_sent_but_ignored_for_routing() {
        let stub = StubServer::start().await.unwrap();
        stub.scope().get("/").reply(CannedResponse::new(200)).unwrap();

        let response = Agent::new(stub.uri())
            .get(RequestConfig::new("/").query("limit", "10").expect_status(200))
            .await
            .unwrap();

        assert_eq!(response.status_code, 200);
        assert_eq!(stub.received_requests().unwrap()[0].uri, "/?limit=10");
    }

    #[tokio::test]
    async fn text_responses_are_not_parsed() {
        let stub = StubServer::start().await.unwrap();
        stub.scope()
            .put("/")
            .reply(CannedResponse::text(400, "Expecting value: line 1 column 1 (char 0)"))
            .unwrap();

        let response = Agent::new(stub.uri())
            .put(RequestConfig::new("/").raw("<value/>").expect_status(400))
            .await
            .unwrap();

        assert!(response.json().is_none());
        assert_eq!(response.text(), "Expecting value: line 1 column 1 (char 0)");
        assert_eq!(
            stub.received_requests().unwrap()[0].header("content-type"),
            Some("application/x-www-form-urlencoded")
        );
    }

    #[tokio::test]
    async fn unmatched_requests_get_the_fallback() {
        let stub = StubServer::start().await.unwrap();
        stub.set_fallback(CannedResponse::new(418)).unwrap();

        let response = Agent::new(stub.uri())
            .get(RequestConfig::new("/missing"))
            .await
            .unwrap();

        assert_eq!(response.status_code, 418);
        stub.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn redirects_are_not_followed() {
        let stub = redirecting_stub().await;

        let response = Agent::new(stub.uri())
            .get(RequestConfig::new("/").expect_status(302))
            .await
            .unwrap();

        assert_eq!(response.status_code, 302);
        assert_eq!(response.header("location"), Some("/moved"));
        let requests = stub.received_requests().unwrap();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].uri, "/");
    }

    #[tokio::test]
    async fn a_provided_reqwest_client_keeps_its_redirect_policy() {
        let stub = redirecting_stub().await;
        let agent = AgentBuilder::new()
            .with_endpoint(stub.uri())
            .with_http_client(Arc::new(ReqwestHttpClient::with_client(
                reqwest::Client::new(),
            )))
            .build()
            .unwrap();

        let response = agent
            .get(RequestConfig::new("/").expect_status(200))
            .await
            .unwrap();

        assert_eq!(response.json().unwrap()["moved"], true);
        let uris: Vec<String> = stub
            .received_requests()
            .unwrap()
            .into_iter()
            .map(|request| request.uri)
            .collect();
        assert_eq!(uris, vec!["/", "/moved"]);
    }

    #[tokio::test]
    async fn stub_listens_on_loopback() {
        let stub = StubServer::start().await.unwrap();

        assert!(stub.address().ip().is_loopback());
        assert_ne!(stub.address().port(), 0);
        assert_eq!(stub.uri(), format!("http://{}", stub.address()));
    }

    #[tokio::test]
    async fn unserializable_body_fails_before_sending() {
        let stub = StubServer::start().await.unwrap();
        let mut body = HashMap::new();
        body.insert(vec![1u8], "keys must be strings");

        let result = Agent::new(stub.uri())
            .put(RequestConfig::new("/").json(&body).expect_status(200))
            .await;

        assert!(matches!(result, Err(Error::JsonError(_))));
        assert!(stub.received_requests().unwrap().is_empty());
    }

    #[tokio::test]
    async fn transport_failure_is_returned() {
        let result = Agent::new(closed_port_endpoint())
            .get(RequestConfig::new("/").expect_status(200))
            .await;

        match result {
            Err(e @ Error::ReqwestError(_)) => assert!(e.response().is_none()),
            other => panic!("expected a transport error, got {:?}", other),
        }
    }

    #[harness_test]
    async fn interceptor_answers_once_without_network() {
        let endpoint = closed_port_endpoint();
        mock::mock_server_error(&endpoint).unwrap();

        let response = Agent::new(endpoint.as_str())
            .get(RequestConfig::new("/"))
            .await
            .unwrap();
        assert_eq!(response.status_code, 500);
        assert!(interceptor::is_done().unwrap());

        let second = Agent::new(endpoint.as_str())
            .get(RequestConfig::new("/"))
            .await;
        assert!(matches!(second, Err(Error::ReqwestError(_))));
    }

    #[harness_test]
    async fn interceptor_is_bound_to_its_endpoint_and_verb() {
        let stub = StubServer::start().await.unwrap();
        intercept("http://elsewhere.test")
            .get("/")
            .reply(CannedResponse::new(500))
            .unwrap();
        intercept(stub.uri()).put("/").reply(CannedResponse::new(500)).unwrap();

        let response = Agent::new(stub.uri())
            .get(RequestConfig::new("/"))
            .await
            .unwrap();

        assert_eq!(response.status_code, 404);
        assert_eq!(interceptor::pending().unwrap().len(), 2);

        interceptor::clean_all().unwrap();
        assert!(interceptor::is_done().unwrap());
    }

    #[harness_test]
    async fn regex_interceptor_with_repeats() {
        let endpoint = closed_port_endpoint();
        intercept(&endpoint)
            .delete(Regex::new(r"^/items/\d+$").unwrap())
            .times(2)
            .reply(CannedResponse::json(200, json!({ "deleted": true })))
            .unwrap();

        let agent = Agent::new(endpoint.as_str());
        for id in 1..=2 {
            let response = agent
                .delete(RequestConfig::new(format!("/items/{}", id)).expect_status(200))
                .await
                .unwrap();
            assert_eq!(response.json().unwrap()["deleted"], true);
        }

        assert!(interceptor::is_done().unwrap());
    }

    #[harness_test]
    async fn persisted_interceptor_answers_every_time() {
        let endpoint = closed_port_endpoint();
        intercept(&endpoint)
            .get("/")
            .persist()
            .reply(CannedResponse::new(503))
            .unwrap();

        let agent = Agent::new(endpoint.as_str());
        for _ in 0..3 {
            let response = agent
                .get(RequestConfig::new("/").expect_status(503))
                .await
                .unwrap();
            assert!(response.is_server_error());
        }

        assert!(interceptor::pending().unwrap().is_empty());
        assert!(interceptor::is_done().unwrap());
    }

    #[harness_test]
    async fn relative_request_path_is_intercepted() {
        let endpoint = closed_port_endpoint();
        intercept(&endpoint)
            .get("/items")
            .reply(CannedResponse::new(204))
            .unwrap();

        let response = Agent::new(endpoint.as_str())
            .get(RequestConfig::new("items").expect_status(204))
            .await
            .unwrap();

        assert_eq!(response.status_code, 204);
        assert!(interceptor::is_done().unwrap());
    }

    #[harness_test(debug_logging)]
    async fn configured_log_filter_session_runs() {
        let stub = StubServer::start().await.unwrap();

        let response = Agent::new(stub.uri())
            .get(RequestConfig::new("/").expect_status(404))
            .await
            .unwrap();

        assert_eq!(response.json().unwrap()["message"], "Not Found");
    }

    #[harness_test(configure_harness)]
    async fn configured_interceptors_are_used() {
        let response = Agent::new("http://configured.test/")
            .get(RequestConfig::new("/").expect_status(200))
            .await
            .unwrap();

        assert_eq!(response.json().unwrap().as_array().unwrap().len(), 1);
    }

    #[harness_test]
    async fn mocked_get_request_server_error() -> Result<(), Error> {
        let response = mock::mock_get_request_server_error("http://crud-api.test").await?;

        assert!((500..=599).contains(&response.status_code));
        assert_eq!(response.json().unwrap()["status"], 500);
        assert_eq!(response.json().unwrap()["message"], "Internal Server Error");
        Ok(())
    }

    #[derive(Debug, Default)]
    struct RecordingHttpClient {
        requests: Mutex<Vec<(String, RequestData)>>,
    }

    #[async_trait]
    impl HttpClient for RecordingHttpClient {
        async fn make_request(
            &self,
            endpoint: &str,
            request_data: &RequestData,
        ) -> Result<ResponseData, Error> {
            self.requests
                .lock()?
                .push((String::from(endpoint), request_data.clone()));

            Ok(ResponseData::new(204, HashMap::new(), String::new()))
        }
    }

    #[tokio::test]
    async fn custom_http_client_receives_every_request() {
        let client = Arc::new(RecordingHttpClient::default());
        let agent = AgentBuilder::new()
            .with_endpoint("http://recorded.test")
            .with_http_client(client.clone())
            .build()
            .unwrap();

        agent
            .put(RequestConfig::new("/").json(&json!({ "main_key": "k" })).expect_status(204))
            .await
            .unwrap();

        let requests = client.requests.lock().unwrap();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].0, "http://recorded.test");
        assert_eq!(requests[0].1.method, Method::PUT);
        assert_eq!(requests[0].1.body, r#"{"main_key":"k"}"#);
    }

    #[test]
    fn agent_builder_requires_an_endpoint() {
        assert!(matches!(
            AgentBuilder::new().build(),
            Err(Error::NotConfigured(_))
        ));
    }
}
