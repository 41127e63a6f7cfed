//! Wire representations of backend resources
//!
//! The backend is not perfectly uniform. These types absorb the variations
//! seen in practice and convert into the domain types:
//!
//! - the cached premium arrives as `premiumCached` or `premium`
//! - references arrive flat (`customerId`) or nested (`customer: { id }`)
//! - amounts may be JSON numbers or numeric strings
//! - statuses may arrive in any letter case
//! - `active` flags may be booleans, strings or 0/1

use chrono::NaiveDate;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use core_kernel::{ClaimId, CustomerId, PolicyId, PortError, ProductId, QuoteId};
use domain_claims::{Assessment, AssessmentDecision, Claim, ClaimStatus};
use domain_policy::{Customer, Policy, PolicyStatus, Product, Quote, QuoteStatus};

/// A reference to another resource, embedded as `{ "id": .. }`
#[derive(Debug, Clone, Deserialize)]
pub struct ResourceRef {
    pub id: i64,
}

fn reference(flat: Option<i64>, nested: Option<ResourceRef>) -> Option<i64> {
    flat.or(nested.map(|r| r.id))
}

fn required_reference(
    flat: Option<i64>,
    nested: Option<ResourceRef>,
    resource: &str,
    field: &str,
) -> Result<i64, PortError> {
    reference(flat, nested)
        .ok_or_else(|| PortError::transformation(format!("{resource} has no {field}")))
}

fn parse_status<S: DeserializeOwned>(raw: &str, resource: &str) -> Result<S, PortError> {
    serde_json::from_value(Value::String(raw.trim().to_uppercase()))
        .map_err(|_| PortError::transformation(format!("{resource} has unknown status '{raw}'")))
}

fn whole_u64(value: Decimal, field: &str) -> Result<u64, PortError> {
    if !value.fract().is_zero() {
        return Err(PortError::transformation(format!("{field} {value} is not a whole number")));
    }
    value
        .to_u64()
        .ok_or_else(|| PortError::transformation(format!("{field} {value} is out of range")))
}

fn whole_u32(value: Decimal, field: &str) -> Result<u32, PortError> {
    u32::try_from(whole_u64(value, field)?)
        .map_err(|_| PortError::transformation(format!("{field} {value} is out of range")))
}

fn truthy(value: &Value) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::String(s) => s.eq_ignore_ascii_case("true") || s == "1",
        Value::Number(n) => n.as_i64() == Some(1),
        _ => false,
    }
}

/// A collection response: a bare array or a page wrapping one
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ListResource<T> {
    Items(Vec<T>),
    Page {
        #[serde(alias = "items", alias = "data")]
        content: Vec<T>,
    },
}

impl<T> ListResource<T> {
    pub fn into_vec(self) -> Vec<T> {
        match self {
            ListResource::Items(items) | ListResource::Page { content: items } => items,
        }
    }
}

/// Quote as returned by `/quotes`
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteResource {
    pub id: i64,
    #[serde(default)]
    pub customer_id: Option<i64>,
    #[serde(default)]
    pub customer: Option<ResourceRef>,
    #[serde(default)]
    pub product_id: Option<i64>,
    #[serde(default)]
    pub product: Option<ResourceRef>,
    pub sum_assured: Decimal,
    pub term_months: Decimal,
    #[serde(default)]
    pub premium_cached: Option<Decimal>,
    #[serde(default)]
    pub premium: Option<Decimal>,
    #[serde(default)]
    pub pricing_source: Option<String>,
    pub status: String,
}

impl TryFrom<QuoteResource> for Quote {
    type Error = PortError;

    fn try_from(r: QuoteResource) -> Result<Self, Self::Error> {
        Ok(Quote {
            id: QuoteId::new(r.id),
            customer_id: CustomerId::new(required_reference(
                r.customer_id,
                r.customer,
                "quote",
                "customer",
            )?),
            product_id: ProductId::new(required_reference(r.product_id, r.product, "quote", "product")?),
            sum_assured: whole_u64(r.sum_assured, "sumAssured")?,
            term_months: whole_u32(r.term_months, "termMonths")?,
            premium: r.premium_cached.or(r.premium),
            pricing_source: r.pricing_source,
            status: parse_status::<QuoteStatus>(&r.status, "quote")?,
        })
    }
}

/// Policy as returned by `/policies`
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PolicyResource {
    pub id: i64,
    #[serde(default)]
    pub policy_number: Option<String>,
    #[serde(default)]
    pub quote_id: Option<i64>,
    #[serde(default)]
    pub quote: Option<ResourceRef>,
    #[serde(default)]
    pub customer_id: Option<i64>,
    #[serde(default)]
    pub customer: Option<ResourceRef>,
    #[serde(default)]
    pub product_id: Option<i64>,
    #[serde(default)]
    pub product: Option<ResourceRef>,
    #[serde(default)]
    pub premium: Option<Decimal>,
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
    pub status: String,
}

impl TryFrom<PolicyResource> for Policy {
    type Error = PortError;

    fn try_from(r: PolicyResource) -> Result<Self, Self::Error> {
        Ok(Policy {
            id: PolicyId::new(r.id),
            policy_number: r.policy_number,
            quote_id: reference(r.quote_id, r.quote).map(QuoteId::new),
            customer_id: reference(r.customer_id, r.customer).map(CustomerId::new),
            product_id: reference(r.product_id, r.product).map(ProductId::new),
            premium: r.premium,
            start_date: r.start_date,
            status: parse_status::<PolicyStatus>(&r.status, "policy")?,
        })
    }
}

/// What the backend answers to `POST /quotes/{id}/confirm`
///
/// Either the full policy, or just enough to read it back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfirmedPolicy {
    Complete(Policy),
    Reference(PolicyId),
}

impl ConfirmedPolicy {
    /// Reads the policy out of a confirm response
    ///
    /// The policy is taken from `policy`, then `policyId`, then the body
    /// itself.
    pub fn from_body(body: Value) -> Result<Self, PortError> {
        if let Some(policy) = body.get("policy").filter(|p| p.is_object()) {
            return Self::decode(policy.clone());
        }
        if let Some(id) = body.get("policyId").and_then(id_value) {
            return Ok(Self::Reference(PolicyId::new(id)));
        }
        Self::decode(body)
    }

    fn decode(policy: Value) -> Result<Self, PortError> {
        let id = policy
            .get("id")
            .and_then(id_value)
            .ok_or_else(|| PortError::transformation("confirmation response carries no policy id"))?;
        let complete = policy.get("status").is_some_and(Value::is_string);
        if complete {
            // An echoed quote has a string status too; only a decodable policy counts.
            if let Ok(resource) = serde_json::from_value::<PolicyResource>(policy) {
                if let Ok(policy) = Policy::try_from(resource) {
                    return Ok(Self::Complete(policy));
                }
            }
        }
        Ok(Self::Reference(PolicyId::new(id)))
    }
}

fn id_value(value: &Value) -> Option<i64> {
    value
        .as_i64()
        .or_else(|| value.as_str().and_then(|s| s.trim().parse().ok()))
}

/// Product as returned by `/products`
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductResource {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub code: String,
    pub base_rate_per_1000: Decimal,
    pub min_sum_assured: Decimal,
    pub max_sum_assured: Decimal,
    pub min_term_months: Decimal,
    pub max_term_months: Decimal,
    #[serde(default)]
    pub active: Value,
}

impl TryFrom<ProductResource> for Product {
    type Error = PortError;

    fn try_from(r: ProductResource) -> Result<Self, Self::Error> {
        Ok(Product {
            id: ProductId::new(r.id),
            name: r.name,
            code: r.code,
            base_rate_per_1000: r.base_rate_per_1000,
            min_sum_assured: whole_u64(r.min_sum_assured, "minSumAssured")?,
            max_sum_assured: whole_u64(r.max_sum_assured, "maxSumAssured")?,
            min_term_months: whole_u32(r.min_term_months, "minTermMonths")?,
            max_term_months: whole_u32(r.max_term_months, "maxTermMonths")?,
            active: truthy(&r.active),
        })
    }
}

/// Customer as returned by `/customers`
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerResource {
    pub id: i64,
    pub first_name: String,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

impl From<CustomerResource> for Customer {
    fn from(r: CustomerResource) -> Self {
        Customer {
            id: CustomerId::new(r.id),
            first_name: r.first_name,
            last_name: r.last_name,
            email: r.email,
        }
    }
}

/// Claim as returned by `/claims`
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClaimResource {
    pub id: i64,
    #[serde(default)]
    pub policy_id: Option<i64>,
    #[serde(default)]
    pub policy: Option<ResourceRef>,
    #[serde(default)]
    pub description: Option<String>,
    pub loss_date: NaiveDate,
    pub status: String,
    #[serde(default)]
    pub decision: Option<String>,
    #[serde(default)]
    pub approved_amount: Option<Decimal>,
    #[serde(default)]
    pub reason: Option<String>,
}

impl TryFrom<ClaimResource> for Claim {
    type Error = PortError;

    fn try_from(r: ClaimResource) -> Result<Self, Self::Error> {
        let decision = r
            .decision
            .as_deref()
            .filter(|d| !d.trim().is_empty())
            .map(|d| parse_status::<AssessmentDecision>(d, "claim"))
            .transpose()?;
        Ok(Claim {
            id: ClaimId::new(r.id),
            policy_id: PolicyId::new(required_reference(r.policy_id, r.policy, "claim", "policy")?),
            description: r.description.unwrap_or_default(),
            loss_date: r.loss_date,
            status: parse_status::<ClaimStatus>(&r.status, "claim")?,
            decision,
            approved_amount: r.approved_amount,
            reason: r.reason,
        })
    }
}

/// Body of `POST /claims/{id}/assess`
///
/// Amounts go out as JSON numbers.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssessBody {
    pub decision: AssessmentDecision,
    #[serde(
        with = "rust_decimal::serde::float_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub approved_amount: Option<Decimal>,
    pub reason: String,
}

impl From<Assessment> for AssessBody {
    fn from(a: Assessment) -> Self {
        Self {
            decision: a.decision,
            approved_amount: a.approved_amount,
            reason: a.reason,
        }
    }
}
