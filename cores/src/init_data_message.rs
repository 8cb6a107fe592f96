
use std::collections::BTreeMap;

use url::form_urlencoded;

use crate::init_data_errors::VerificationError;

pub const HASH_FIELD: &str = "hash";
pub const SIGNATURE_FIELD: &str = "signature";
pub const USER_FIELD: &str = "user";
pub const AUTH_DATE_FIELD: &str = "auth_date";

// Decoded init data fields. `String` ordering is byte-wise on UTF-8, which matches code point order.
pub type InitDataFields = BTreeMap<String, String>;

// Decodes an `application/x-www-form-urlencoded` payload. A repeated key keeps its last value,
// an empty key is kept like URLSearchParams keeps it. Only a payload without any pair is malformed.
pub fn parse_fields(payload: &str) -> Result<InitDataFields, VerificationError> {
    let mut fields = InitDataFields::new();
    for (key, value) in form_urlencoded::parse(payload.as_bytes()) {
        fields.insert(key.into_owned(), value.into_owned());
    }
    if fields.is_empty() {
        return Err(VerificationError::MalformedPayload);
    }
    Ok(fields)
}

// https://core.telegram.org/bots/webapps#validating-data-received-via-the-mini-app
// data-check-string: every field except the excluded ones, sorted by key, `key=value` joined by '\n'
pub fn canonical_message(payload: &str, exclude_keys: &[&str]) -> Result<String, VerificationError> {
    let fields = parse_fields(payload)?;
    Ok(render_canonical(&fields, exclude_keys))
}

pub fn render_canonical(fields: &InitDataFields, exclude_keys: &[&str]) -> String {
    fields.iter()
        .filter(|(key, _)| !exclude_keys.contains(&key.as_str()))
        .map(|(key, value)| [key.as_str(), value.as_str()].join("="))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn encode(pairs: &[(String, String)]) -> String {
        let mut serializer = form_urlencoded::Serializer::new(String::new());
        for (key, value) in pairs {
            serializer.append_pair(key, value);
        }
        serializer.finish()
    }

    #[test]
    fn field_order_does_not_change_the_message() {
        let left = canonical_message("auth_date=1700000000&user=%7B%22id%22%3A1%7D&hash=abc", &[HASH_FIELD]).unwrap();
        let right = canonical_message("user=%7B%22id%22%3A1%7D&auth_date=1700000000&hash=abc", &[HASH_FIELD]).unwrap();
        assert_eq!(left, right);
        assert_eq!(left, "auth_date=1700000000\nuser={\"id\":1}");
    }

    #[test]
    fn excluded_fields_are_dropped() {
        let payload = "signature=c2ln&query_id=q1&hash=abc&auth_date=1";
        assert_eq!(
            canonical_message(payload, &[SIGNATURE_FIELD, HASH_FIELD]).unwrap(),
            "auth_date=1\nquery_id=q1"
        );
        assert_eq!(
            canonical_message(payload, &[HASH_FIELD]).unwrap(),
            "auth_date=1\nquery_id=q1\nsignature=c2ln"
        );
    }

    #[test]
    fn values_are_decoded_exactly_once() {
        let message = canonical_message("start_param=a%2520b&chat_type=private+chat", &[]).unwrap();
        assert_eq!(message, "chat_type=private chat\nstart_param=a%20b");
    }

    #[test]
    fn last_occurrence_wins() {
        let fields = parse_fields("user=first&auth_date=1&user=second").unwrap();
        assert_eq!(fields.get(USER_FIELD).map(String::as_str), Some("second"));
        assert_eq!(fields.len(), 2);
    }

    #[test]
    fn keys_sort_by_code_point() {
        let message = canonical_message("b=2&Z=3&%C3%A9=4&a=1", &[]).unwrap();
        assert_eq!(message, "Z=3\na=1\nb=2\né=4");
    }

    #[test]
    fn no_trailing_newline() {
        let message = canonical_message("a=1&b=2", &[]).unwrap();
        assert!(!message.ends_with('\n'));
    }

    #[test]
    fn rejects_unparseable_payloads() {
        assert_eq!(parse_fields(""), Err(VerificationError::MalformedPayload));
        assert_eq!(parse_fields("&&"), Err(VerificationError::MalformedPayload));
    }

    #[test]
    fn empty_key_takes_part_in_the_message() {
        let fields = parse_fields("=value&a=1").unwrap();
        assert_eq!(fields.get("").map(String::as_str), Some("value"));
        assert_eq!(canonical_message("a=1&=value&hash=abc", &[HASH_FIELD]).unwrap(), "=value\na=1");
    }

    proptest! {
        #[test]
        fn any_permutation_yields_the_same_message(
            (ordered, shuffled) in proptest::collection::btree_map("[a-g_]{1,8}", "[ -~]{0,16}", 1..10)
                .prop_flat_map(|fields| {
                    let pairs: Vec<(String, String)> = fields.into_iter().collect();
                    (Just(pairs.clone()), Just(pairs).prop_shuffle())
                })
        ) {
            let mut ordered = ordered;
            let mut shuffled = shuffled;
            ordered.push((HASH_FIELD.to_string(), "abc".to_string()));
            shuffled.insert(0, (HASH_FIELD.to_string(), "abc".to_string()));
            let left = canonical_message(&encode(&ordered), &[HASH_FIELD]).unwrap();
            let right = canonical_message(&encode(&shuffled), &[HASH_FIELD]).unwrap();
            prop_assert_eq!(left, right);
        }
    }
}
