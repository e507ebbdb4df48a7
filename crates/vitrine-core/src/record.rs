use std::fmt;

use serde::{Serialize, Serializer};

use crate::money::{Installment, Money};

/// Outcome of one collection attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Status {
    /// Cash, Pix and installment plan all found.
    Ok,
    OkNoInstallments,
    OkNoPix,
    OkCashOnly,
    /// Cash and/or installments came from rendered markup that cannot tell a
    /// Pix price apart from the cash price; an operator has to fill Pix in.
    PixRequiresManualInput,
    CollectionError,
    DataUnavailable,
    LinkMissing,
    InvalidLink,
    UnsupportedChannel,
    LoginRequired,
    ProductUnavailable,
    /// An internal fault absorbed at the collector boundary.
    CollectorFault { category: String, detail: String },
}

impl Status {
    /// Classifies a collection from which of the three fields were found.
    ///
    /// `on_missing` is the retailer's status for "no cash price"
    /// ([`Status::CollectionError`] or [`Status::DataUnavailable`]).
    #[must_use]
    pub fn classify(has_avista: bool, has_pix: bool, has_prazo: bool, on_missing: Status) -> Self {
        match (has_avista, has_pix, has_prazo) {
            (true, true, true) => Status::Ok,
            (true, true, false) => Status::OkNoInstallments,
            (true, false, true) => Status::OkNoPix,
            (true, false, false) => Status::OkCashOnly,
            (false, _, _) => on_missing,
        }
    }

    /// `true` for the four `OK*` outcomes.
    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(
            self,
            Status::Ok | Status::OkNoInstallments | Status::OkNoPix | Status::OkCashOnly
        )
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let code = match self {
            Status::Ok => "OK",
            Status::OkNoInstallments => "OK_NO_INSTALLMENTS",
            Status::OkNoPix => "OK_NO_PIX",
            Status::OkCashOnly => "OK_CASH_ONLY",
            Status::PixRequiresManualInput => "PIX_REQUIRES_MANUAL_INPUT",
            Status::CollectionError => "COLLECTION_ERROR",
            Status::DataUnavailable => "DATA_UNAVAILABLE",
            Status::LinkMissing => "LINK_MISSING",
            Status::InvalidLink => "INVALID_LINK",
            Status::UnsupportedChannel => "UNSUPPORTED_CHANNEL",
            Status::LoginRequired => "LOGIN_REQUIRED",
            Status::ProductUnavailable => "PRODUCT_UNAVAILABLE",
            Status::CollectorFault { category, detail } => {
                return write!(f, "COLLECTOR_FAULT: {category} | {detail}");
            }
        };
        f.write_str(code)
    }
}

impl Serialize for Status {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// The pricing fields collected for one product link.
///
/// Built once per attempt and handed straight to the output writer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PriceRecord {
    pub avista: Option<Money>,
    pub pix: Option<Money>,
    pub prazo: Option<Installment>,
    pub status: Status,
}

impl PriceRecord {
    /// A record with no fields, carrying only `status`.
    #[must_use]
    pub fn empty(status: Status) -> Self {
        Self {
            avista: None,
            pix: None,
            prazo: None,
            status,
        }
    }

    /// Builds a record and derives its status from the fields present.
    #[must_use]
    pub fn classified(
        avista: Option<Money>,
        pix: Option<Money>,
        prazo: Option<Installment>,
        on_missing: Status,
    ) -> Self {
        let status = Status::classify(avista.is_some(), pix.is_some(), prazo.is_some(), on_missing);
        Self {
            avista,
            pix,
            prazo,
            status,
        }
    }

    /// A record for a fault absorbed at the collector boundary.
    #[must_use]
    pub fn fault(category: impl Into<String>, detail: impl Into<String>) -> Self {
        Self::empty(Status::CollectorFault {
            category: category.into(),
            detail: detail.into(),
        })
    }
}
