//! Claims DTOs

use chrono::NaiveDate;
use serde::Deserialize;

use core_kernel::{Notice, PolicyId};
use domain_claims::Claim;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateClaimBody {
    pub policy_id: PolicyId,
    pub description: String,
    pub loss_date: NaiveDate,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateClaimBody {
    pub description: String,
    pub loss_date: NaiveDate,
}

pub fn filed_notice(claim: &Claim) -> Notice {
    Notice::confirmation(format!("Claim filed (id: {})", claim.id.value()))
}

pub fn updated_notice() -> Notice {
    Notice::confirmation("Claim updated successfully")
}

pub fn assessed_notice(claim: &Claim) -> Notice {
    match (claim.decision, claim.approved_amount) {
        (Some(decision), Some(amount)) => {
            Notice::confirmation(format!("Claim assessed — {decision}, amount: {amount}"))
        }
        (Some(decision), None) => Notice::confirmation(format!("Claim assessed — {decision}")),
        (None, _) => Notice::confirmation("Claim assessed"),
    }
}

pub fn closed_notice() -> Notice {
    Notice::confirmation("Claim closed")
}
