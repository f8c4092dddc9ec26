//! Curtain price calculation

/// Price of one metre of curtain tape
pub const TAPE_PRICE: f64 = 30.0;

/// Price of one unit of stitching work
pub const STITCH_PRICE: f64 = 25.0;

/// The seven values collected from the user
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PricingInputs {
    pub length: f64,
    pub coeff: f64,
    pub curtain_price: f64,
    pub metraj2: f64,
    pub multiplier: f64,
    pub extra: f64,
    pub tape_metraj: f64,
}

/// Itemized price. Values are unrounded; rounding happens only when rendered.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PricedResult {
    pub fabric_metraj: f64,
    pub curtain_cost: f64,
    pub stitching_cost: f64,
    pub tape_cost: f64,
    pub total: f64,
}

pub fn compute(inputs: &PricingInputs) -> PricedResult {
    let fabric_metraj = inputs.length * inputs.coeff;
    let curtain_cost = fabric_metraj * inputs.curtain_price;
    let stitching_cost = (inputs.metraj2 * inputs.multiplier + inputs.extra) * STITCH_PRICE;
    let tape_cost = inputs.tape_metraj * TAPE_PRICE;

    PricedResult {
        fabric_metraj,
        curtain_cost,
        stitching_cost,
        tape_cost,
        total: curtain_cost + stitching_cost + tape_cost,
    }
}
