//! Extension subset validator (§4.3): both the client's and the
//! authenticator's reported extension identifiers must be subsets of what
//! the RP actually requested. No extension semantics are interpreted here
//! — only identifier membership.

use std::collections::BTreeSet;

use ciborium::value::Value;

use crate::error::CoreError;

/// Checks that `clientExtensionResults` and the authenticator's extension
/// map (if any) only name identifiers present in `requested`.
///
/// `requested` mirrors the shape of the original registration/assertion
/// request: `None` means no extensions were requested, so both responses
/// must report an empty set.
pub fn validate(
    requested: Option<&serde_json::Map<String, serde_json::Value>>,
    client_extension_results: Option<&serde_json::Map<String, serde_json::Value>>,
    authenticator_extensions: Option<&Value>,
) -> Result<(), CoreError> {
    let requested_ids: BTreeSet<&str> = requested
        .map(|m| m.keys().map(String::as_str).collect())
        .unwrap_or_default();

    if let Some(client) = client_extension_results {
        for id in client.keys() {
            if !requested_ids.contains(id.as_str()) {
                return Err(CoreError::contract(format!(
                    "client extension \"{id}\" was not requested"
                )));
            }
        }
    }

    if let Some(value) = authenticator_extensions {
        let map = value
            .as_map()
            .ok_or_else(|| CoreError::malformed("authenticator extensions must be a CBOR map"))?;
        for (key, _) in map {
            let id = key
                .as_text()
                .ok_or_else(|| CoreError::malformed("authenticator extension identifier must be text"))?;
            if !requested_ids.contains(id) {
                return Err(CoreError::contract(format!(
                    "authenticator extension \"{id}\" was not requested"
                )));
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn requested(ids: &[&str]) -> serde_json::Map<String, serde_json::Value> {
        let mut map = serde_json::Map::new();
        for id in ids {
            map.insert((*id).to_owned(), json!(true));
        }
        map
    }

    #[test]
    fn empty_everything_is_ok() {
        assert!(validate(None, None, None).is_ok());
    }

    #[test]
    fn client_subset_of_requested_is_ok() {
        let requested = requested(&["appid", "uvm"]);
        let client = requested(&["appid"]);
        assert!(validate(Some(&requested), Some(&client), None).is_ok());
    }

    #[test]
    fn client_extension_outside_requested_fails() {
        let requested = requested(&["appid"]);
        let client = requested(&["uvm"]);
        assert!(validate(Some(&requested), Some(&client), None).is_err());
    }

    #[test]
    fn client_extension_with_nothing_requested_fails() {
        let client = requested(&["appid"]);
        assert!(validate(None, Some(&client), None).is_err());
    }

    #[test]
    fn authenticator_extension_subset_is_ok() {
        let requested = requested(&["hmac-secret"]);
        let auth_ext = ciborium::cbor!({ "hmac-secret" => true }).unwrap();
        assert!(validate(Some(&requested), None, Some(&auth_ext)).is_ok());
    }

    #[test]
    fn authenticator_extension_outside_requested_fails() {
        let requested = requested(&["hmac-secret"]);
        let auth_ext = ciborium::cbor!({ "cred-protect" => 1 }).unwrap();
        assert!(validate(Some(&requested), None, Some(&auth_ext)).is_err());
    }

    #[test]
    fn non_map_authenticator_extensions_fails() {
        let auth_ext = ciborium::cbor!(42).unwrap();
        assert!(validate(None, None, Some(&auth_ext)).is_err());
    }
}
