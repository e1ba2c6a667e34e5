use clap::Args;
use rust_decimal::Decimal;
use serde_json::{json, Value};

use peer_valuation_core::units::{normalize, UnitTag, UNIT_TABLE_VERSION};
use peer_valuation_core::valuation::{
    self, BalanceSheetInputs, FinancialStatementInputs, PeerMultiples, ValuationInput,
    ValuationOutcome,
};

use crate::input;
use crate::Reply;

/// Exit code when the inputs are rejected by validation.
pub const EXIT_INVALID_INPUT: i32 = 2;

/// Company figures and peer data, from a document or individual flags
#[derive(Args)]
#[command(allow_hyphen_values = true)]
pub struct InputArgs {
    /// Path to a JSON or YAML input document (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    /// Company name (echoed in the output)
    #[arg(long)]
    pub company: Option<String>,

    /// Revenue
    #[arg(long)]
    pub revenue: Option<Decimal>,

    /// Unit of --revenue (base, thousands, millions, billions, 百万円, ...)
    #[arg(long)]
    pub revenue_unit: Option<String>,

    /// EBITDA
    #[arg(long)]
    pub ebitda: Option<Decimal>,

    /// Unit of --ebitda
    #[arg(long)]
    pub ebitda_unit: Option<String>,

    /// Net income
    #[arg(long)]
    pub net_income: Option<Decimal>,

    /// Unit of --net-income
    #[arg(long)]
    pub net_income_unit: Option<String>,

    /// Total debt
    #[arg(long)]
    pub total_debt: Option<Decimal>,

    /// Unit of --total-debt
    #[arg(long)]
    pub debt_unit: Option<String>,

    /// Cash and equivalents
    #[arg(long)]
    pub cash: Option<Decimal>,

    /// Unit of --cash
    #[arg(long)]
    pub cash_unit: Option<String>,

    /// Shares outstanding
    #[arg(long, alias = "shares-outstanding")]
    pub shares: Option<Decimal>,

    /// Unit of --shares (e.g. thousands, 千株)
    #[arg(long)]
    pub shares_unit: Option<String>,

    /// Path to a JSON or YAML peer table (list of rows or {columns, rows})
    #[arg(long)]
    pub peers: Option<String>,

    /// Single unit applied to every flag without its own unit
    #[arg(long)]
    pub unit: Option<String>,
}

/// Arguments for a valuation run
#[derive(Args)]
pub struct ValueArgs {
    #[command(flatten)]
    pub inputs: InputArgs,

    /// Emit the flat report layout (multiples / share_prices / summary maps)
    #[arg(long)]
    pub flat: bool,
}

/// Arguments for input validation only
#[derive(Args)]
pub struct ValidateArgs {
    #[command(flatten)]
    pub inputs: InputArgs,
}

/// Arguments for unit normalization
#[derive(Args)]
#[command(allow_hyphen_values = true)]
pub struct NormalizeArgs {
    /// Value as reported
    #[arg(long)]
    pub value: Decimal,

    /// Unit label the value was reported in
    #[arg(long, default_value = "base")]
    pub unit: String,
}

pub fn run_value(args: ValueArgs) -> Result<Reply, Box<dyn std::error::Error>> {
    let valuation_input = load_input(&args.inputs)?;
    let output = valuation::run_valuation(&valuation_input);
    let exit_code = exit_code_for(&output.result);

    let value = if args.flat {
        serde_json::to_value(output.result.to_report())?
    } else {
        serde_json::to_value(&output)?
    };
    Ok(Reply { value, exit_code })
}

pub fn run_validate(args: ValidateArgs) -> Result<Reply, Box<dyn std::error::Error>> {
    let i = load_input(&args.inputs)?;
    let outcome = valuation::validate(&i.statement, &i.balance_sheet, &i.peers);

    let value = match outcome.into_result() {
        Ok(normalized) => json!({
            "ok": true,
            "normalized": serde_json::to_value(&normalized)?,
        }),
        Err(failure) => {
            let mut v = serde_json::to_value(&failure)?;
            if let Value::Object(map) = &mut v {
                map.insert("ok".into(), Value::Bool(false));
            }
            return Ok(Reply {
                value: v,
                exit_code: EXIT_INVALID_INPUT,
            });
        }
    };
    Ok(Reply {
        value,
        exit_code: 0,
    })
}

pub fn run_normalize(args: NormalizeArgs) -> Result<Reply, Box<dyn std::error::Error>> {
    let unit = UnitTag::parse_lenient(&args.unit);
    let normalized = normalize(args.value, unit).ok_or_else(|| {
        format!(
            "{} in {} is outside the representable range in base units",
            args.value, unit
        )
    })?;
    let value = json!({
        "value": args.value,
        "label": args.unit,
        "unit": unit,
        "factor": unit.factor(),
        "normalized": normalized,
        "unit_table_version": UNIT_TABLE_VERSION,
    });
    Ok(Reply {
        value,
        exit_code: 0,
    })
}

fn exit_code_for(outcome: &ValuationOutcome) -> i32 {
    if outcome.is_computed() {
        0
    } else {
        EXIT_INVALID_INPUT
    }
}

/// Input precedence: --input file, then piped stdin, then individual flags.
fn load_input(args: &InputArgs) -> Result<ValuationInput, Box<dyn std::error::Error>> {
    if let Some(ref path) = args.input {
        return input::file::read_document(path);
    }
    if let Some(doc) = input::stdin::read_document()? {
        return Ok(doc);
    }
    from_flags(args)
}

fn from_flags(args: &InputArgs) -> Result<ValuationInput, Box<dyn std::error::Error>> {
    let default_unit = args.unit.as_deref();
    let unit = |own: &Option<String>| -> UnitTag {
        own.as_deref()
            .or(default_unit)
            .map(UnitTag::parse_lenient)
            .unwrap_or_default()
    };

    // Without --peers the table is empty and validation reports it.
    let peers: PeerMultiples = match args.peers {
        Some(ref path) => input::file::read_document(path)?,
        None => PeerMultiples::default(),
    };

    Ok(ValuationInput {
        company: args.company.clone(),
        statement: FinancialStatementInputs {
            revenue: args.revenue,
            revenue_unit: unit(&args.revenue_unit),
            ebitda: args.ebitda,
            ebitda_unit: unit(&args.ebitda_unit),
            net_income: args.net_income,
            net_income_unit: unit(&args.net_income_unit),
        },
        balance_sheet: BalanceSheetInputs {
            total_debt: args.total_debt,
            debt_unit: unit(&args.debt_unit),
            cash: args.cash,
            cash_unit: unit(&args.cash_unit),
            shares_outstanding: args.shares,
            shares_unit: unit(&args.shares_unit),
        },
        peers,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use rust_decimal_macros::dec;

    #[derive(Parser)]
    struct Harness {
        #[command(flatten)]
        inputs: InputArgs,
    }

    fn parse(args: &[&str]) -> InputArgs {
        let argv = std::iter::once("pval").chain(args.iter().copied());
        Harness::try_parse_from(argv).unwrap().inputs
    }

    #[test]
    fn test_default_unit_applies_to_unlabelled_flags() {
        let args = parse(&[
            "--revenue=1000",
            "--ebitda=200",
            "--net-income=100",
            "--shares=10",
            "--shares-unit=千株",
            "--unit=百万円",
        ]);
        let input = from_flags(&args).unwrap();
        assert_eq!(input.statement.revenue, Some(dec!(1000)));
        assert_eq!(input.statement.revenue_unit, UnitTag::Millions);
        assert_eq!(input.statement.net_income_unit, UnitTag::Millions);
        assert_eq!(input.balance_sheet.shares_unit, UnitTag::Thousands);
        assert_eq!(input.balance_sheet.total_debt, None);
        assert!(input.peers.is_empty());
    }

    #[test]
    fn test_negative_figures_accepted_as_values() {
        let args = parse(&["--revenue=-5", "--cash=-1.5"]);
        let input = from_flags(&args).unwrap();
        assert_eq!(input.statement.revenue, Some(dec!(-5)));
        assert_eq!(input.balance_sheet.cash, Some(dec!(-1.5)));
        assert_eq!(input.balance_sheet.cash_unit, UnitTag::Base);
    }

    #[test]
    fn test_normalize_reply() {
        let reply = run_normalize(NormalizeArgs {
            value: dec!(2.5),
            unit: "百万円".into(),
        })
        .unwrap();
        assert_eq!(reply.exit_code, 0);
        assert_eq!(reply.value["unit"], "millions");
        assert_eq!(reply.value["normalized"], "2500000.0");
    }

    #[test]
    fn test_normalize_out_of_range_is_an_error() {
        let result = run_normalize(NormalizeArgs {
            value: dec!(79228162514264337593543),
            unit: "billions".into(),
        });
        let err = result.err().unwrap();
        assert!(err.to_string().contains("outside the representable range"));
    }

    #[test]
    fn test_flag_input_without_peers_is_invalid() {
        let args = parse(&[
            "--revenue=1000",
            "--ebitda=200",
            "--net-income=100",
            "--total-debt=300",
            "--cash=50",
            "--shares=10",
        ]);
        let outcome = valuation::run_valuation(&from_flags(&args).unwrap());
        assert_eq!(exit_code_for(&outcome.result), EXIT_INVALID_INPUT);
    }
}
