//! Built-in metrics.

use std::sync::Arc;

use unicorn_core::types::{AggregationExpr, Filter, FilterOp, FilterValue};

use super::Metric;

const SWINGS: [&str; 3] = ["swinging_strike", "foul", "in_play"];

fn flag(field: &str) -> Filter {
    Filter::eq(field, FilterValue::Bool(true))
}

fn text(field: &str, value: &str) -> Filter {
    Filter::eq(field, FilterValue::Text(value.to_string()))
}

fn swing() -> Filter {
    Filter::new(
        "result_pitch",
        FilterOp::In(SWINGS.iter().map(|s| FilterValue::Text((*s).to_string())).collect()),
    )
}

fn out_of_zone() -> Filter {
    Filter::eq("is_in_zone", FilterValue::Bool(false))
}

macro_rules! metric {
    ($ty:ident, $name:literal, $expr:expr) => {
        pub struct $ty;

        impl Metric for $ty {
            fn name(&self) -> &'static str {
                $name
            }

            fn expression(&self) -> AggregationExpr {
                $expr
            }
        }
    };
}

metric!(CountHr, "count_hr", AggregationExpr::Count { when: vec![flag("is_hr")] });
metric!(HrRate, "hr_rate", AggregationExpr::Rate { numerator: vec![flag("is_hr")] });
metric!(
    HardHitRate,
    "hard_hit_rate",
    AggregationExpr::Rate { numerator: vec![flag("is_hard_hit")] }
);
metric!(
    CountBarrels,
    "count_barrels",
    AggregationExpr::Count { when: vec![flag("is_barrel")] }
);
metric!(
    AvgExitVelocity,
    "avg_ev",
    AggregationExpr::Average { field: "launch_speed".to_string() }
);
metric!(
    XwobaAvg,
    "xwoba_avg",
    AggregationExpr::Average { field: "xwoba".to_string() }
);
metric!(
    WhiffRate,
    "whiff_rate",
    AggregationExpr::Ratio {
        numerator: vec![text("result_pitch", "swinging_strike")],
        denominator: vec![swing()],
    }
);
metric!(
    ContactRate,
    "contact_rate",
    AggregationExpr::Ratio {
        numerator: vec![text("result_pitch", "in_play")],
        denominator: vec![swing()],
    }
);
metric!(
    ChaseRate,
    "chase_rate",
    AggregationExpr::Ratio {
        numerator: vec![out_of_zone(), swing()],
        denominator: vec![out_of_zone()],
    }
);
metric!(
    CountStrikeouts,
    "count_strikeouts",
    AggregationExpr::Count { when: vec![text("result", "K")] }
);

pub(crate) fn all() -> Vec<Arc<dyn Metric>> {
    vec![
        Arc::new(CountHr),
        Arc::new(HrRate),
        Arc::new(HardHitRate),
        Arc::new(CountBarrels),
        Arc::new(AvgExitVelocity),
        Arc::new(XwobaAvg),
        Arc::new(WhiffRate),
        Arc::new(ContactRate),
        Arc::new(ChaseRate),
        Arc::new(CountStrikeouts),
    ]
}
