//! Colour and marker lookup handed to renderers.

use crate::metadata::{AlgorithmIdentity, GENERALIZED_FAMILY};
use crate::schema::ElitismPolicy;

/// How one algorithm's series should be drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlotStyle {
    pub color: &'static str,
    pub symbol: &'static str,
}

impl PlotStyle {
    pub const DEFAULT_COLOR: &'static str = "black";
    pub const DEFAULT_SYMBOL: &'static str = "x";

    pub fn for_identity(identity: &AlgorithmIdentity) -> Self {
        Self {
            color: color_for(&identity.family),
            symbol: symbol_for(&identity.elitism),
        }
    }
}

fn color_for(family: &str) -> &'static str {
    match family {
        "SimpleReplacement" => "grey",
        GENERALIZED_FAMILY | "MAP Elite" | "Simple Adaptive GA" => "green",
        _ => PlotStyle::DEFAULT_COLOR,
    }
}

fn symbol_for(elitism: &ElitismPolicy) -> &'static str {
    match elitism {
        ElitismPolicy::GreedySelection => "+",
        ElitismPolicy::MetropolisHastings => "o",
        ElitismPolicy::Unclassified(_) => PlotStyle::DEFAULT_SYMBOL,
    }
}

/// Source of display names and styles for a renderer.
pub trait StyleLookup {
    fn label(&self, identity: &AlgorithmIdentity) -> String;
    fn style(&self, identity: &AlgorithmIdentity) -> PlotStyle;
}

/// The built-in lookup.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultStyles;

impl StyleLookup for DefaultStyles {
    fn label(&self, identity: &AlgorithmIdentity) -> String {
        identity.display_name()
    }

    fn style(&self, identity: &AlgorithmIdentity) -> PlotStyle {
        PlotStyle::for_identity(identity)
    }
}
