use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::error::PeerValuationError;
use crate::types::{Money, Multiple, Shares};
use crate::units::UnitTag;
use crate::PeerValuationResult;

// ---------------------------------------------------------------------------
// Reported figures
// ---------------------------------------------------------------------------

/// Income-statement figures as reported, each with the unit it was reported in.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FinancialStatementInputs {
    pub revenue: Option<Money>,
    #[serde(default)]
    pub revenue_unit: UnitTag,
    pub ebitda: Option<Money>,
    #[serde(default)]
    pub ebitda_unit: UnitTag,
    pub net_income: Option<Money>,
    #[serde(default)]
    pub net_income_unit: UnitTag,
}

impl FinancialStatementInputs {
    /// All three figures reported in the same unit.
    pub fn uniform(revenue: Money, ebitda: Money, net_income: Money, unit: UnitTag) -> Self {
        Self {
            revenue: Some(revenue),
            revenue_unit: unit,
            ebitda: Some(ebitda),
            ebitda_unit: unit,
            net_income: Some(net_income),
            net_income_unit: unit,
        }
    }
}

/// Balance-sheet figures as reported.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BalanceSheetInputs {
    pub total_debt: Option<Money>,
    #[serde(default, alias = "total_debt_unit")]
    pub debt_unit: UnitTag,
    pub cash: Option<Money>,
    #[serde(default)]
    pub cash_unit: UnitTag,
    pub shares_outstanding: Option<Shares>,
    #[serde(default, alias = "shares_outstanding_unit")]
    pub shares_unit: UnitTag,
}

// ---------------------------------------------------------------------------
// Peer table
// ---------------------------------------------------------------------------

/// A multiple column of the peer table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PeerColumn {
    EvRevenue,
    EvEbitda,
    PeRatio,
}

impl PeerColumn {
    pub const REQUIRED: [PeerColumn; 3] =
        [PeerColumn::EvRevenue, PeerColumn::EvEbitda, PeerColumn::PeRatio];

    pub fn as_str(self) -> &'static str {
        match self {
            PeerColumn::EvRevenue => "ev_revenue",
            PeerColumn::EvEbitda => "ev_ebitda",
            PeerColumn::PeRatio => "pe_ratio",
        }
    }

    fn from_key(key: &str) -> Option<PeerColumn> {
        PeerColumn::REQUIRED.into_iter().find(|c| c.as_str() == key)
    }
}

impl std::fmt::Display for PeerColumn {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One comparable company. Any cell may be missing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PeerRow {
    #[serde(default, alias = "company", skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default)]
    pub ev_revenue: Option<Multiple>,
    #[serde(default)]
    pub ev_ebitda: Option<Multiple>,
    #[serde(default)]
    pub pe_ratio: Option<Multiple>,
}

impl PeerRow {
    pub fn new(ev_revenue: Multiple, ev_ebitda: Multiple, pe_ratio: Multiple) -> Self {
        Self {
            name: None,
            ev_revenue: Some(ev_revenue),
            ev_ebitda: Some(ev_ebitda),
            pe_ratio: Some(pe_ratio),
        }
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn get(&self, column: PeerColumn) -> Option<Multiple> {
        match column {
            PeerColumn::EvRevenue => self.ev_revenue,
            PeerColumn::EvEbitda => self.ev_ebitda,
            PeerColumn::PeRatio => self.pe_ratio,
        }
    }
}

/// Peer multiples with the set of columns the table declares.
///
/// A declared column may still have every cell missing; that is distinct
/// from the column not being declared at all.
///
/// Deserializes from either a list of row objects (a column is declared when
/// any row carries its key, even as `null`) or `{"columns": [...], "rows": [...]}`
/// (all three columns declared when `columns` is omitted).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawPeerTable")]
pub struct PeerMultiples {
    columns: BTreeSet<PeerColumn>,
    rows: Vec<PeerRow>,
}

impl PeerMultiples {
    /// Table declaring all three columns.
    pub fn from_rows(rows: Vec<PeerRow>) -> Self {
        Self {
            columns: PeerColumn::REQUIRED.into_iter().collect(),
            rows,
        }
    }

    pub fn with_columns(columns: impl IntoIterator<Item = PeerColumn>, rows: Vec<PeerRow>) -> Self {
        Self {
            columns: columns.into_iter().collect(),
            rows,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn rows(&self) -> &[PeerRow] {
        &self.rows
    }

    pub fn has_column(&self, column: PeerColumn) -> bool {
        self.columns.contains(&column)
    }

    /// Non-missing values of `column`, in row order. Empty for undeclared columns.
    pub fn values(&self, column: PeerColumn) -> Vec<Multiple> {
        if !self.has_column(column) {
            return Vec::new();
        }
        self.rows.iter().filter_map(|r| r.get(column)).collect()
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawPeerTable {
    Table {
        #[serde(default)]
        columns: Option<Vec<PeerColumn>>,
        rows: Vec<PeerRow>,
    },
    Records(Vec<serde_json::Map<String, serde_json::Value>>),
}

impl TryFrom<RawPeerTable> for PeerMultiples {
    type Error = PeerValuationError;

    fn try_from(raw: RawPeerTable) -> Result<Self, Self::Error> {
        match raw {
            RawPeerTable::Table {
                columns: Some(columns),
                rows,
            } => Ok(PeerMultiples::with_columns(columns, rows)),
            RawPeerTable::Table { columns: None, rows } => Ok(PeerMultiples::from_rows(rows)),
            RawPeerTable::Records(records) => {
                let mut columns = BTreeSet::new();
                let mut rows = Vec::with_capacity(records.len());
                for (i, record) in records.into_iter().enumerate() {
                    columns.extend(record.keys().filter_map(|k| PeerColumn::from_key(k)));
                    let row: PeerRow = serde_json::from_value(serde_json::Value::Object(record))
                        .map_err(|e| PeerValuationError::InvalidInput {
                            field: format!("peers[{i}]"),
                            reason: e.to_string(),
                        })?;
                    rows.push(row);
                }
                Ok(PeerMultiples { columns, rows })
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Normalized figures
// ---------------------------------------------------------------------------

/// All six figures in base currency units and single shares.
///
/// Only produced by a successful validation, so every field is known and
/// net debt is within the `Decimal` range.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NormalizedFinancials {
    revenue: Money,
    ebitda: Money,
    net_income: Money,
    total_debt: Money,
    cash: Money,
    shares_outstanding: Shares,
    net_debt: Money,
}

/// Figures already scaled to base units.
#[derive(Debug, Clone, Copy)]
pub(crate) struct BaseFigures {
    pub revenue: Money,
    pub ebitda: Money,
    pub net_income: Money,
    pub total_debt: Money,
    pub cash: Money,
    pub shares_outstanding: Shares,
}

impl NormalizedFinancials {
    /// `None` when `total_debt - cash` leaves the `Decimal` range.
    pub(crate) fn from_base(figures: BaseFigures) -> Option<Self> {
        let net_debt = figures.total_debt.checked_sub(figures.cash)?;
        Some(Self {
            revenue: figures.revenue,
            ebitda: figures.ebitda,
            net_income: figures.net_income,
            total_debt: figures.total_debt,
            cash: figures.cash,
            shares_outstanding: figures.shares_outstanding,
            net_debt,
        })
    }

    pub fn revenue(&self) -> Money {
        self.revenue
    }

    pub fn ebitda(&self) -> Money {
        self.ebitda
    }

    pub fn net_income(&self) -> Money {
        self.net_income
    }

    pub fn total_debt(&self) -> Money {
        self.total_debt
    }

    pub fn cash(&self) -> Money {
        self.cash
    }

    pub fn shares_outstanding(&self) -> Shares {
        self.shares_outstanding
    }

    pub fn net_debt(&self) -> Money {
        self.net_debt
    }
}

// ---------------------------------------------------------------------------
// Input document
// ---------------------------------------------------------------------------

/// Everything one valuation call consumes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ValuationInput {
    /// Company name, echoed in assumptions only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
    #[serde(default, alias = "pl")]
    pub statement: FinancialStatementInputs,
    #[serde(default, alias = "bs")]
    pub balance_sheet: BalanceSheetInputs,
    #[serde(default, alias = "comps")]
    pub peers: PeerMultiples,
}

impl ValuationInput {
    /// Parse an input document. Shape errors only; figures are checked by
    /// validation.
    pub fn from_json(json: &str) -> PeerValuationResult<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    #[test]
    fn test_records_declare_columns_from_keys() {
        let peers: PeerMultiples = serde_json::from_str(
            r#"[
                {"company": "A", "ev_revenue": 2.5, "pe_ratio": null},
                {"company": "B", "ev_revenue": 3.0}
            ]"#,
        )
        .unwrap();

        assert_eq!(peers.len(), 2);
        assert!(peers.has_column(PeerColumn::EvRevenue));
        assert!(peers.has_column(PeerColumn::PeRatio));
        assert!(!peers.has_column(PeerColumn::EvEbitda));
        assert_eq!(peers.values(PeerColumn::EvRevenue), vec![dec!(2.5), dec!(3.0)]);
        assert!(peers.values(PeerColumn::PeRatio).is_empty());
        assert_eq!(peers.rows()[0].name.as_deref(), Some("A"));
    }

    #[test]
    fn test_table_form_without_columns_declares_all() {
        let peers: PeerMultiples =
            serde_json::from_str(r#"{"rows": [{"ev_ebitda": "12.5"}]}"#).unwrap();
        for column in PeerColumn::REQUIRED {
            assert!(peers.has_column(column));
        }
        assert_eq!(peers.values(PeerColumn::EvEbitda), vec![dec!(12.5)]);
    }

    #[test]
    fn test_table_form_with_explicit_columns() {
        let peers: PeerMultiples = serde_json::from_str(
            r#"{"columns": ["ev_revenue"], "rows": [{"ev_revenue": 2, "pe_ratio": 20}]}"#,
        )
        .unwrap();
        assert!(!peers.has_column(PeerColumn::PeRatio));
        // Undeclared columns contribute nothing even when cells exist.
        assert!(peers.values(PeerColumn::PeRatio).is_empty());
    }

    #[test]
    fn test_serialized_table_reads_back() {
        let peers = PeerMultiples::with_columns(
            [PeerColumn::EvRevenue, PeerColumn::PeRatio],
            vec![PeerRow::new(dec!(2), dec!(10), dec!(15)).named("X")],
        );
        let json = serde_json::to_string(&peers).unwrap();
        let back: PeerMultiples = serde_json::from_str(&json).unwrap();
        assert_eq!(back, peers);
    }

    #[test]
    fn test_bad_cell_is_shape_error() {
        let result: Result<PeerMultiples, _> =
            serde_json::from_str(r#"[{"ev_revenue": "not a number"}]"#);
        let err = result.unwrap_err().to_string();
        assert!(err.contains("peers[0]"), "{err}");
    }

    #[test]
    fn test_from_json_reports_serialization_error() {
        let err = ValuationInput::from_json("{not json").unwrap_err();
        assert!(matches!(err, PeerValuationError::SerializationError(_)));
    }

    #[test]
    fn test_input_document_aliases() {
        let input: ValuationInput = serde_json::from_str(
            r#"{
                "pl": {"revenue": 1000, "revenue_unit": "百万円"},
                "bs": {"shares_outstanding": 10, "shares_unit": "千株"},
                "comps": []
            }"#,
        )
        .unwrap();
        assert_eq!(input.statement.revenue, Some(dec!(1000)));
        assert_eq!(input.statement.revenue_unit, UnitTag::Millions);
        assert_eq!(input.statement.ebitda, None);
        assert_eq!(input.statement.ebitda_unit, UnitTag::Base);
        assert_eq!(input.balance_sheet.shares_unit, UnitTag::Thousands);
        assert!(input.peers.is_empty());
    }

    #[test]
    fn test_normalized_figures() {
        let figures = BaseFigures {
            revenue: dec!(1000000000),
            ebitda: dec!(200000000),
            net_income: dec!(100000000),
            total_debt: dec!(300000000),
            cash: dec!(50000000),
            shares_outstanding: dec!(10000),
        };
        let n = NormalizedFinancials::from_base(figures).unwrap();
        assert_eq!(n.revenue(), dec!(1000000000));
        assert_eq!(n.shares_outstanding(), dec!(10000));
        assert_eq!(n.net_debt(), dec!(250000000));
    }

    #[test]
    fn test_net_debt_out_of_range_is_rejected() {
        let figures = BaseFigures {
            revenue: dec!(1),
            ebitda: dec!(1),
            net_income: dec!(1),
            total_debt: Decimal::MAX,
            cash: dec!(-1),
            shares_outstanding: dec!(1),
        };
        assert!(NormalizedFinancials::from_base(figures).is_none());
    }
}
