//! Serde helpers for numbers that upstreams emit either as JSON numbers or as
//! numeric strings.

use serde::de::Error;
use serde::{Deserialize, Deserializer};

#[derive(Deserialize)]
#[serde(untagged)]
enum Lenient {
    Number(serde_json::Number),
    Text(String),
}

pub fn f64<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
    match Lenient::deserialize(deserializer)? {
        Lenient::Number(n) => n
            .as_f64()
            .ok_or_else(|| D::Error::custom(format!("number {n} is not representable as f64"))),
        Lenient::Text(s) => s
            .trim()
            .parse()
            .map_err(|_| D::Error::custom(format!("expected a number, got {s:?}"))),
    }
}

pub fn u64<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u64, D::Error> {
    match Lenient::deserialize(deserializer)? {
        Lenient::Number(n) => n
            .as_u64()
            .ok_or_else(|| D::Error::custom(format!("expected a non-negative integer, got {n}"))),
        Lenient::Text(s) => s
            .trim()
            .parse()
            .map_err(|_| D::Error::custom(format!("expected a non-negative integer, got {s:?}"))),
    }
}

pub fn u32<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u32, D::Error> {
    let value = u64(deserializer)?;
    u32::try_from(value).map_err(|_| D::Error::custom(format!("{value} is out of range")))
}

pub fn opt_u64<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<u64>, D::Error> {
    #[derive(Deserialize)]
    struct Wrapped(#[serde(deserialize_with = "u64")] u64);

    Ok(Option::<Wrapped>::deserialize(deserializer)?.map(|Wrapped(v)| v))
}
