//! Token-binding decision table (§4.2): a pure function over the client's
//! declared Token Binding status and the RP's own declared binding id. Both
//! inputs are optional; the table below is total over every combination.

use crate::error::CoreError;
use crate::model::{TokenBindingInfo, TokenBindingStatus};

/// Validates a client's declared token binding against the RP's own.
/// Returns `Ok(())` if the pair is an accepted combination; every rejection
/// carries the specific reason from the decision table.
pub fn validate(client: Option<&TokenBindingInfo>, rp_binding_id: Option<&str>) -> Result<(), CoreError> {
    match (client, rp_binding_id) {
        (None, None) => Ok(()),
        (None, Some(_)) => Err(CoreError::contract(
            "RP requires token binding but client did not declare any",
        )),
        (Some(tb), rp_id) => match tb.status {
            TokenBindingStatus::Supported | TokenBindingStatus::NotSupported => match rp_id {
                None => Ok(()),
                Some(_) => Err(CoreError::contract(
                    "RP requires token binding but client does not use it",
                )),
            },
            TokenBindingStatus::Present => {
                let client_id = tb
                    .id
                    .as_deref()
                    .ok_or_else(|| CoreError::contract("token binding status present but id missing"))?;
                match rp_id {
                    None => Err(CoreError::contract(
                        "client declared a token binding id but RP declared none",
                    )),
                    Some(rp_id) if rp_id == client_id => Ok(()),
                    Some(_) => Err(CoreError::contract("token binding id mismatch")),
                }
            }
        },
    }
}
