//! Request bodies shared by the test cases. Never mutated.

use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyValue {
    pub main_key: &'static str,
    pub value: &'static str,
}

#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct MainKey {
    pub main_key: &'static str,
}

/// An entry as the store lists it. `value` is not guaranteed to be a string.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct StoredValue {
    pub main_key: String,
    pub value: Value,
}

pub const ADD_NEW_VALUE: KeyValue = KeyValue {
    main_key: "AAATestKey1",
    value: "AAATestValue1",
};

pub const DELETE_VALUE: MainKey = MainKey {
    main_key: "AAATestKey1",
};

pub const NON_EXISTING_VALUE: KeyValue = KeyValue {
    main_key: "NonExistentKey",
    value: "NonExistentValue",
};

pub const POST_VALUE_NOT_EXIST: KeyValue = KeyValue {
    main_key: "AAATestKey1",
    value: "AAATestValue2",
};

pub const POST_VALUE_EXIST: KeyValue = KeyValue {
    main_key: "Ocicat",
    value: "Kellie Lind Updated",
};

pub const XML_BODY: &str = "<value>AAATestValue1</value><main_key>AAATestKey1</main_key>";

pub const XML_HEADER: (&str, &str) = ("Content-Type", "application/xml");

/// How many entries the store holds before refusing new ones.
pub const QUOTA: usize = 10;
