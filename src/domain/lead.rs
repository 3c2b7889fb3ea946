// src/domain/lead.rs
use serde::{Deserialize, Serialize};

/// What the lead wants out of the market. Immutable once set:
/// no mutation in the contract changes it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    Buyer,
    Seller,
    Investor,
}

impl Intent {
    pub fn as_str(self) -> &'static str {
        match self {
            Intent::Buyer => "buyer",
            Intent::Seller => "seller",
            Intent::Investor => "investor",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "buyer" => Some(Intent::Buyer),
            "seller" => Some(Intent::Seller),
            "investor" => Some(Intent::Investor),
            _ => None,
        }
    }
}

/// Coarse contact status. Independent axis from the pipeline stages:
/// any status is reachable from any status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LeadStatus {
    New,
    Contacted,
    Qualified,
}

impl LeadStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            LeadStatus::New => "new",
            LeadStatus::Contacted => "contacted",
            LeadStatus::Qualified => "qualified",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "new" => Some(LeadStatus::New),
            "contacted" => Some(LeadStatus::Contacted),
            "qualified" => Some(LeadStatus::Qualified),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BuyerStage {
    Searching,
    Showings,
    OfferOut,
    UnderContract,
    Closed,
}

impl BuyerStage {
    pub fn as_str(self) -> &'static str {
        match self {
            BuyerStage::Searching => "searching",
            BuyerStage::Showings => "showings",
            BuyerStage::OfferOut => "offer_out",
            BuyerStage::UnderContract => "under_contract",
            BuyerStage::Closed => "closed",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "searching" => Some(BuyerStage::Searching),
            "showings" => Some(BuyerStage::Showings),
            "offer_out" => Some(BuyerStage::OfferOut),
            "under_contract" => Some(BuyerStage::UnderContract),
            "closed" => Some(BuyerStage::Closed),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SellerStage {
    PreListing,
    OnMarket,
    OfferIn,
    UnderContract,
    Sold,
}

impl SellerStage {
    pub fn as_str(self) -> &'static str {
        match self {
            SellerStage::PreListing => "pre_listing",
            SellerStage::OnMarket => "on_market",
            SellerStage::OfferIn => "offer_in",
            SellerStage::UnderContract => "under_contract",
            SellerStage::Sold => "sold",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pre_listing" => Some(SellerStage::PreListing),
            "on_market" => Some(SellerStage::OnMarket),
            "offer_in" => Some(SellerStage::OfferIn),
            "under_contract" => Some(SellerStage::UnderContract),
            "sold" => Some(SellerStage::Sold),
            _ => None,
        }
    }
}

/// Derived dimension for the pipeline views: which intent family a
/// lead's kanban belongs to. Investors have no pipeline board.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LeadType {
    Buyer,
    Seller,
}

impl LeadType {
    pub fn intent_str(self) -> &'static str {
        match self {
            LeadType::Buyer => "buyer",
            LeadType::Seller => "seller",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "buyer" => Some(LeadType::Buyer),
            "seller" => Some(LeadType::Seller),
            _ => None,
        }
    }
}

/// A prospective buyer/seller/investor contact. Never hard-deleted.
#[derive(Debug, Clone, Serialize)]
pub struct Lead {
    pub id: String,
    pub created_at: i64,

    pub name: String,
    pub phone: String,
    pub email: Option<String>,
    pub property_address: Option<String>,
    pub timeline: Option<String>,
    pub notes: Option<String>,
    pub preferred_location: Option<String>,

    pub intent: Intent,
    pub source: String,
    pub status: LeadStatus,
    /// 0..=100 heuristic of how time-sensitive the lead is.
    pub urgency_score: i64,

    pub buyer_pipeline_stage: Option<BuyerStage>,
    pub seller_pipeline_stage: Option<SellerStage>,

    pub list_price: Option<i64>,
    pub listed_date: Option<String>,
    pub budget: Option<i64>,

    pub conversion_prediction: Option<String>,
    pub ai_suggestion: Option<String>,
    pub last_message_sentiment: Option<String>,
    pub last_message_content: Option<String>,

    /// Display order = insertion order; the store dedups.
    pub tags: Vec<String>,
}

/// Fields accepted when creating a lead from the dashboard.
#[derive(Debug, Clone, Deserialize)]
pub struct NewLead {
    pub name: String,
    pub phone: String,
    pub email: Option<String>,
    pub property_address: Option<String>,
    pub timeline: Option<String>,
    pub notes: Option<String>,
    pub intent: Intent,
    pub source: String,
    /// Defaults to `new` when unspecified.
    pub status: Option<LeadStatus>,
}
