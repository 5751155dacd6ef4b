//! Property-based tests for the flow algebra and the propagator.
//!
//! Uses proptest to generate random flows and pipelines, then verify the
//! algebraic identities and utility bounds hold.

use flowplan_core::flow::*;
use flowplan_core::machine::CalculatedMachineInstance;
use flowplan_core::pipeline::*;
use flowplan_core::resource::ResourceType;
use flowplan_core::test_utils::*;
use proptest::prelude::*;

// ===========================================================================
// Generators
// ===========================================================================

fn arb_resource() -> impl Strategy<Value = ResourceType> {
    (0..ResourceType::ALL.len()).prop_map(|i| ResourceType::ALL[i])
}

fn arb_flow() -> impl Strategy<Value = ResourceFlow> {
    proptest::collection::vec((arb_resource(), -1000.0..1000.0f64), 0..8)
        .prop_map(|entries| entries.into_iter().collect())
}

fn arb_positive_flow() -> impl Strategy<Value = ResourceFlow> {
    proptest::collection::vec((arb_resource(), 0.5..500.0f64), 1..6)
        .prop_map(|entries| entries.into_iter().collect())
}

/// A mining stage followed by up to four converter stages with random
/// priorities, clock speeds, and rates.
fn arb_pipeline() -> impl Strategy<Value = ProductionPipeline> {
    let machine = (1.0..120.0f64, 0.01..2.5f64, -3..4i32);
    let stage = proptest::collection::vec(machine, 0..5);
    (1.0..200.0f64, proptest::collection::vec(stage, 0..4)).prop_map(|(mined, stages)| {
        let mut ids = SequentialIdGenerator::new();
        let mut pipeline = ProductionPipeline::new("random")
            .with_stage(ProductionStage::new("mine").with_machine(miner(
                &mut ids,
                ResourceType::IronOre,
                mined,
            )));
        for (i, machines) in stages.into_iter().enumerate() {
            let mut stage = ProductionStage::new(&format!("stage {i}"));
            for (rate, clock, priority) in machines {
                stage.machines.push(
                    converter(
                        &mut ids,
                        ResourceType::IronOre,
                        rate,
                        ResourceType::IronOre,
                        rate,
                    )
                    .with_clock_speed(clock)
                    .with_priority(priority),
                );
            }
            pipeline.stages.push(stage);
        }
        pipeline
    })
}

// ===========================================================================
// Properties
// ===========================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// Adding or subtracting the empty flow is the identity.
    #[test]
    fn empty_flow_is_identity(f in arb_flow()) {
        let mut added = f.clone();
        add(&mut added, &ResourceFlow::new());
        prop_assert_eq!(&added, &f);

        let mut subtracted = f.clone();
        subtract(&mut subtracted, &ResourceFlow::new());
        prop_assert_eq!(&subtracted, &f);
    }

    /// subtract(add(a, b), b) == a within tolerance.
    #[test]
    fn add_then_subtract_round_trips(a in arb_flow(), b in arb_flow()) {
        let back = a.clone().added(&b).subtracted(&b);
        prop_assert!(back.approx_eq(&a, 1e-9), "a = {:?}, back = {:?}", a, back);
    }

    /// Nothing required means fully satisfiable.
    #[test]
    fn divide_by_empty_is_one(available in arb_flow()) {
        prop_assert_eq!(divide(&available, &ResourceFlow::new()), 1.0);
    }

    /// An empty pool cannot satisfy any requirement.
    #[test]
    fn divide_empty_pool_is_negative_infinity(required in arb_positive_flow()) {
        prop_assert_eq!(divide(&ResourceFlow::new(), &required), f64::NEG_INFINITY);
    }

    /// Scaling by one or NaN leaves a flow unchanged; infinity acts as one;
    /// negatives act as zero.
    #[test]
    fn scale_guards_hold(f in arb_flow(), negative in -1e6..-1e-6f64) {
        prop_assert_eq!(&f.clone().scaled(1.0), &f);
        prop_assert_eq!(&f.clone().scaled(f64::NAN), &f);
        prop_assert_eq!(&f.clone().scaled(f64::INFINITY), &f.clone().scaled(1.0));
        prop_assert_eq!(&f.clone().scaled(negative), &f.clone().scaled(0.0));
    }

    /// Utility is always in [0, 1], whatever the raw ratio.
    #[test]
    fn utility_is_bounded(raw in prop_oneof![
        any::<f64>(),
        Just(f64::NEG_INFINITY),
        Just(f64::INFINITY),
        Just(f64::NAN),
    ]) {
        let mut ids = SequentialIdGenerator::new();
        let calc = CalculatedMachineInstance::new(
            miner(&mut ids, ResourceType::Coal, 10.0),
            raw,
        );
        prop_assert!((0.0..=1.0).contains(&calc.utility_rate()));
    }

    /// Every computed machine has a bounded utility and the output keeps the
    /// input's shape and order.
    #[test]
    fn pipeline_shape_and_bounds(pipeline in arb_pipeline()) {
        let calc = compute_pipeline(&pipeline);
        prop_assert_eq!(calc.stages.len(), pipeline.stages.len());
        for (stage, calc_stage) in pipeline.stages.iter().zip(&calc.stages) {
            prop_assert_eq!(stage.machines.len(), calc_stage.machines.len());
            for (m, c) in stage.machines.iter().zip(&calc_stage.machines) {
                prop_assert_eq!(&m.id, &c.instance.id);
                prop_assert!((0.0..=1.0).contains(&c.utility_rate()));
            }
        }
    }

    /// The pool never goes meaningfully negative: rationing never hands out
    /// more than is available.
    #[test]
    fn pool_never_overdrawn(pipeline in arb_pipeline()) {
        let calc = compute_pipeline(&pipeline);
        prop_assert!(calc.surplus.get(ResourceType::IronOre) > -1e-6);
    }

    /// Recomputing the same snapshot yields the same result.
    #[test]
    fn computation_is_deterministic(pipeline in arb_pipeline()) {
        prop_assert_eq!(compute_pipeline(&pipeline), compute_pipeline(&pipeline));
    }
}
