#[path = "../../fta-sim/tests/data_shapes.rs"]
mod data_shapes;

#[path = "../../fta-sim/tests/full_campaign.rs"]
mod full_campaign;

#[path = "../../fta-sim/tests/stat_acceptance.rs"]
mod stat_acceptance;
