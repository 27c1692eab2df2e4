//! Layer compositor.
//!
//! Builds one composite object (a *cake*) from an ordered list of layer
//! producers. Each later layer sees, and may override or extend, the
//! properties of the layers beneath it. Every layer's behaviors can reach
//! the final cake through *self* and the cake as it stood before that layer
//! through *super*; both are bound late, after all layers are merged.
//!
//! Two disciplines sit on the same compositor:
//!
//! - **Override** (class style): later names replace earlier ones.
//! - **Disjoint** (trait style): names must not repeat across layers; a
//!   repeat aborts the composition with [`ComposeError::Conflict`].
//!
//! # Quick Start
//!
//! ```rust
//! use cake_core::{layer, make_class_cake};
//! use cake_types::{expect_number, LayerMapping, Value};
//!
//! let base = layer("base", |late| {
//!     let late = late.clone();
//!     LayerMapping::new()
//!         .method("getX", |_| Ok(Value::from(3)))
//!         .method("double", move |_| {
//!             let x = expect_number(&late.call_self("getX", &[])?, "double")?;
//!             Ok(Value::from(x * 2.0))
//!         })
//! });
//! let shifted = layer("shifted", |late| {
//!     let late = late.clone();
//!     LayerMapping::new().method("getX", move |_| {
//!         let x = expect_number(&late.call_super("getX", &[])?, "getX")?;
//!         Ok(Value::from(x + 1.0))
//!     })
//! });
//!
//! let cake = make_class_cake(vec![base, shifted]).unwrap();
//! assert_eq!(cake.call("double", &[]).unwrap(), Value::from(8.0));
//! ```

pub mod binding;
pub mod compositor;
pub mod config;
pub mod error;
pub mod layer;
pub mod strategies;

// Re-exports for convenience.
pub use binding::{Binding, LateBinding};
pub use compositor::{Composition, CompositionReport, Compositor, LayerRecord};
pub use config::{ComposeConfig, ConflictReport, Discipline};
pub use error::{ComposeError, Result};
pub use layer::{layer, FnLayer, LayerFault, LayerProducer, TwoPhaseLayer};
pub use strategies::{CombineStrategy, Combined, DisjointStrategy, OverrideStrategy, Rejection};

use cake_types::Cake;

/// Compose `layers` under `config`.
pub fn compose<I>(config: ComposeConfig, layers: I) -> Result<Cake>
where
    I: IntoIterator<Item = Box<dyn LayerProducer>>,
{
    Compositor::new(config).compose(layers)
}

/// Compose with the override discipline.
pub fn make_class_cake<I>(layers: I) -> Result<Cake>
where
    I: IntoIterator<Item = Box<dyn LayerProducer>>,
{
    compose(ComposeConfig::class(), layers)
}

/// Compose with the disjoint discipline.
pub fn make_trait_cake<I>(layers: I) -> Result<Cake>
where
    I: IntoIterator<Item = Box<dyn LayerProducer>>,
{
    compose(ComposeConfig::traits(), layers)
}

#[cfg(test)]
mod tests {
    use std::cell::{Cell, RefCell};
    use std::rc::Rc;

    use cake_types::{expect_number, LayerMapping, Property, PropertyError, Value};
    use serde_json::json;

    use super::{
        compose, layer, make_class_cake, make_trait_cake, Binding, ComposeConfig, ComposeError,
        Compositor, ConflictReport, Discipline, DisjointStrategy, LateBinding, LayerFault,
        LayerProducer, TwoPhaseLayer,
    };

    /// Helper: a layer contributing constant methods.
    fn constants(name: &str, entries: &[(&str, i64)]) -> Box<dyn LayerProducer> {
        let entries: Vec<(String, i64)> = entries.iter().map(|(k, v)| (k.to_string(), *v)).collect();
        layer(name.to_string(), move |_| {
            entries.into_iter().fold(LayerMapping::new(), |m, (k, v)| {
                m.method(&k, move |_| Ok(json!(v)))
            })
        })
    }

    // -----------------------------------------------------------------------
    // 1. Two-phase layers build the wobbly point
    // -----------------------------------------------------------------------
    #[test]
    fn two_phase_wobbly_point() {
        fn base(x: i64, y: i64) -> Box<dyn LayerProducer> {
            Box::new(TwoPhaseLayer::new("base", move || {
                let cell: Rc<RefCell<Option<Binding>>> = Rc::default();
                let this = Rc::clone(&cell);
                let mapping = LayerMapping::new()
                    .method("getX", move |_| Ok(json!(x)))
                    .method("getY", move |_| Ok(json!(y)))
                    .method("toString", move |_| {
                        let binding = this.borrow();
                        let me = binding
                            .as_ref()
                            .ok_or_else(|| PropertyError::Unbound("base".into()))?
                            .this()?;
                        Ok(json!(format!("<{},{}>", me.get("getX")?, me.get("getY")?)))
                    });
                (mapping, move |binding: Binding| *cell.borrow_mut() = Some(binding))
            }))
        }

        fn wobbly(wobble: f64) -> Box<dyn LayerProducer> {
            Box::new(TwoPhaseLayer::new("wobbly", move || {
                let cell: Rc<RefCell<Option<Binding>>> = Rc::default();
                let supr = Rc::clone(&cell);
                let wobble = Cell::new(wobble);
                let mapping = LayerMapping::new().method("getX", move |_| {
                    let binding = supr.borrow();
                    let below = binding
                        .as_ref()
                        .ok_or_else(|| PropertyError::Unbound("wobbly".into()))?
                        .supr()?;
                    let x = expect_number(&below.get("getX")?, "getX")?;
                    let w = wobble.get();
                    wobble.set(w + 1.0);
                    Ok(json!(x + w))
                });
                (mapping, move |binding: Binding| *cell.borrow_mut() = Some(binding))
            }))
        }

        let wp1 = make_class_cake(vec![base(3, 5), wobbly(0.1)]).unwrap();
        let wp2 = make_class_cake(vec![base(3, 5), wobbly(0.1)]).unwrap();
        assert_eq!(wp1.render().unwrap(), "<3.1,5>");
        assert_eq!(wp1.render().unwrap(), "<4.1,5>");
        assert_eq!(wp2.render().unwrap(), "<3.1,5>");
    }

    // -----------------------------------------------------------------------
    // 2. Override wins, and super resolves to the overridden behavior
    // -----------------------------------------------------------------------
    #[test]
    fn override_wins_and_super_sees_previous() {
        let first = Property::method(|_| Ok(json!("first")));
        let second = Property::method(|_| Ok(json!("second")));
        let captured: Rc<RefCell<Option<Binding>>> = Rc::default();

        let l1 = {
            let first = first.clone();
            layer("l1", move |_| LayerMapping::new().with("getX", first))
        };
        let sink = Rc::clone(&captured);
        let second_for_layer = second.clone();
        let l2: Box<dyn LayerProducer> = Box::new(TwoPhaseLayer::new("l2", move || {
            (
                LayerMapping::new().with("getX", second_for_layer),
                move |binding: Binding| *sink.borrow_mut() = Some(binding),
            )
        }));

        let cake = make_class_cake(vec![l1, l2]).unwrap();
        assert!(cake.property("getX").unwrap().ptr_eq(&second));

        let binding = captured.borrow().clone().unwrap();
        let supr = binding.supr().unwrap();
        assert!(supr.property("getX").unwrap().ptr_eq(&first));
        assert_eq!(supr.get("getX").unwrap(), json!("first"));
        assert_eq!(supr.layer_count(), 1);
    }

    // -----------------------------------------------------------------------
    // 3. Disjointness is enforced
    // -----------------------------------------------------------------------
    #[test]
    fn trait_conflict_fails_before_returning() {
        let resumed = Rc::new(Cell::new(0));
        let counting = |name: &'static str, resumed: Rc<Cell<u32>>| -> Box<dyn LayerProducer> {
            Box::new(TwoPhaseLayer::new(name, move || {
                (
                    LayerMapping::new().method("getX", |_| Ok(json!(1))),
                    move |_: Binding| resumed.set(resumed.get() + 1),
                )
            }))
        };

        let err = make_trait_cake(vec![
            counting("a", Rc::clone(&resumed)),
            counting("b", Rc::clone(&resumed)),
        ])
        .unwrap_err();

        assert!(err.is_conflict());
        assert_eq!(err.layer_index(), 1);
        assert_eq!(
            err,
            ComposeError::Conflict {
                index: 1,
                layer: "b".into(),
                keys: vec!["getX".into()],
            }
        );
        // No layer was resumed: composition is all-or-nothing.
        assert_eq!(resumed.get(), 0);
    }

    // -----------------------------------------------------------------------
    // 4. Self is one identity across every layer
    // -----------------------------------------------------------------------
    #[test]
    fn self_is_shared_identity() {
        let bindings: Rc<RefCell<Vec<Binding>>> = Rc::default();
        let recorder = |name: &'static str, key: &'static str| -> Box<dyn LayerProducer> {
            let sink = Rc::clone(&bindings);
            Box::new(TwoPhaseLayer::new(name, move || {
                (
                    LayerMapping::new().method(key, |_| Ok(Value::Null)),
                    move |binding: Binding| sink.borrow_mut().push(binding),
                )
            }))
        };

        let cake = make_class_cake(vec![recorder("a", "a"), recorder("b", "b"), recorder("c", "c")]).unwrap();
        let bindings = bindings.borrow();
        assert_eq!(bindings.len(), 3);
        for binding in bindings.iter() {
            assert!(binding.is_self(&cake));
            assert!(binding.this().unwrap().ptr_eq(&cake));
        }
        // Each layer sees a distinct super; the bottom layer sees none.
        assert!(bindings[0].supr_opt().is_none());
        let s1 = bindings[1].supr().unwrap();
        let s2 = bindings[2].supr().unwrap();
        assert!(!s1.ptr_eq(&s2));
        assert!(!s2.ptr_eq(&cake));
        assert_eq!(s1.keys().count(), 1);
        assert_eq!(s2.keys().count(), 2);
    }

    // -----------------------------------------------------------------------
    // 5. Layers are merged and resumed in input order
    // -----------------------------------------------------------------------
    #[test]
    fn layers_run_in_order() {
        let log: Rc<RefCell<Vec<String>>> = Rc::default();
        let tracer = |name: &'static str| -> Box<dyn LayerProducer> {
            let log = Rc::clone(&log);
            Box::new(TwoPhaseLayer::new(name, move || {
                log.borrow_mut().push(format!("produce {name}"));
                (
                    LayerMapping::new().method(name, |_| Ok(Value::Null)),
                    move |binding: Binding| {
                        log.borrow_mut().push(format!("resume {name} #{}", binding.index()));
                    },
                )
            }))
        };

        make_class_cake(vec![tracer("a"), tracer("b"), tracer("c")]).unwrap();
        assert_eq!(
            *log.borrow(),
            vec![
                "produce a",
                "produce b",
                "produce c",
                "resume a #0",
                "resume b #1",
                "resume c #2",
            ]
        );
    }

    // -----------------------------------------------------------------------
    // 6. Reversing the input changes which contribution wins
    // -----------------------------------------------------------------------
    #[test]
    fn reversing_order_changes_winner() {
        let forward = make_class_cake(vec![
            constants("one", &[("v", 1)]),
            constants("two", &[("v", 2)]),
        ])
        .unwrap();
        let reverse = make_class_cake(vec![
            constants("two", &[("v", 2)]),
            constants("one", &[("v", 1)]),
        ])
        .unwrap();
        assert_eq!(forward.get("v").unwrap(), json!(2));
        assert_eq!(reverse.get("v").unwrap(), json!(1));
    }

    // -----------------------------------------------------------------------
    // 7. Malformed mappings are construction errors naming the layer
    // -----------------------------------------------------------------------
    #[test]
    fn malformed_mapping_is_construction_error() {
        let bad = layer("bad", |_| {
            LayerMapping::new()
                .method("getX", |_| Ok(json!(1)))
                .method("getX", |_| Ok(json!(2)))
        });
        let err = make_class_cake(vec![constants("ok", &[("a", 1)]), bad]).unwrap_err();
        match err {
            ComposeError::Construction { index, layer, reason } => {
                assert_eq!(index, 1);
                assert_eq!(layer, "bad");
                assert!(reason.contains("duplicate property 'getX'"));
            }
            other => panic!("expected construction error, got {other}"),
        }
    }

    // -----------------------------------------------------------------------
    // 8. An invalid property name is a construction error
    // -----------------------------------------------------------------------
    #[test]
    fn invalid_name_is_construction_error() {
        let bad = layer("spaced", |_| LayerMapping::new().method("get X", |_| Ok(json!(1))));
        let err = make_trait_cake(vec![constants("ok", &[("getY", 5)]), bad]).unwrap_err();
        assert_eq!(err.layer_index(), 1);
        match err {
            ComposeError::Construction { layer, reason, .. } => {
                assert_eq!(layer, "spaced");
                assert!(reason.contains("\"get X\""));
            }
            other => panic!("expected construction error, got {other}"),
        }
    }

    // -----------------------------------------------------------------------
    // 9. A failing producer is a construction error
    // -----------------------------------------------------------------------
    #[test]
    fn failing_producer_is_construction_error() {
        struct Broken;
        impl LayerProducer for Broken {
            fn name(&self) -> &str {
                "broken"
            }
            fn produce(&mut self) -> std::result::Result<LayerMapping, LayerFault> {
                Err(LayerFault::Malformed("no properties available".into()))
            }
            fn resume(self: Box<Self>, _binding: Binding) -> std::result::Result<(), LayerFault> {
                Ok(())
            }
        }

        let err = make_class_cake(vec![Box::new(Broken) as Box<dyn LayerProducer>]).unwrap_err();
        assert_eq!(err.layer_index(), 0);
        assert!(matches!(err, ComposeError::Construction { .. }));
    }

    // -----------------------------------------------------------------------
    // 10. Empty layers obey configuration
    // -----------------------------------------------------------------------
    #[test]
    fn empty_layers_follow_config() {
        let cake = make_class_cake(vec![layer("empty", |_| LayerMapping::new())]).unwrap();
        assert!(cake.is_empty());
        assert_eq!(cake.layer_count(), 1);

        let strict = ComposeConfig {
            allow_empty_layers: false,
            ..Default::default()
        };
        let err = compose(strict, vec![layer("empty", |_| LayerMapping::new())]).unwrap_err();
        assert!(err.to_string().contains("no properties"));
    }

    // -----------------------------------------------------------------------
    // 11. Zero layers yield an empty cake
    // -----------------------------------------------------------------------
    #[test]
    fn no_layers_yield_empty_cake() {
        let cake = Compositor::default().compose(Vec::new()).unwrap();
        assert!(cake.is_empty());
        assert_eq!(cake.layer_count(), 0);
    }

    // -----------------------------------------------------------------------
    // 12. Sharing a late binding between layers is protocol misuse
    // -----------------------------------------------------------------------
    #[test]
    fn shared_late_binding_is_protocol_misuse() {
        struct Sharing {
            name: &'static str,
            late: LateBinding,
        }
        impl LayerProducer for Sharing {
            fn name(&self) -> &str {
                self.name
            }
            fn produce(&mut self) -> std::result::Result<LayerMapping, LayerFault> {
                Ok(LayerMapping::new().method(self.name, |_| Ok(Value::Null)))
            }
            fn resume(self: Box<Self>, binding: Binding) -> std::result::Result<(), LayerFault> {
                self.late.bind(binding)
            }
        }

        let late = LateBinding::new();
        let producers: Vec<Box<dyn LayerProducer>> = vec![
            Box::new(Sharing { name: "a", late: late.clone() }),
            Box::new(Sharing { name: "b", late }),
        ];
        let err = make_class_cake(producers).unwrap_err();
        assert!(matches!(err, ComposeError::ProtocolMisuse { index: 1, .. }));
    }

    // -----------------------------------------------------------------------
    // 13. Calling through self during phase one is reported as unbound
    // -----------------------------------------------------------------------
    #[test]
    fn eager_self_call_is_unbound() {
        let eager = layer("eager", |late| {
            let outcome = late.call_self("getX", &[]);
            assert!(matches!(outcome, Err(PropertyError::Unbound(_))));
            LayerMapping::new().method("getX", |_| Ok(json!(0)))
        });
        make_class_cake(vec![eager]).unwrap();
    }

    // -----------------------------------------------------------------------
    // 14. Self sees later layers (forward references)
    // -----------------------------------------------------------------------
    #[test]
    fn self_sees_later_layers() {
        let greeter = layer("greeter", |late| {
            let late = late.clone();
            LayerMapping::new().method("greet", move |_| {
                let name = late.call_self("name", &[])?;
                Ok(json!(format!("hello, {}", name.as_str().unwrap_or("?"))))
            })
        });
        let named = layer("named", |_| LayerMapping::new().accessor("name", || Ok(json!("cake"))));
        let cake = make_trait_cake(vec![greeter, named]).unwrap();
        assert_eq!(cake.call("greet", &[]).unwrap(), json!("hello, cake"));
    }

    // -----------------------------------------------------------------------
    // 15. Bottom layer reaching for super gets NoSuper
    // -----------------------------------------------------------------------
    #[test]
    fn bottom_layer_super_is_absent() {
        let lonely = layer("lonely", |late| {
            let late = late.clone();
            LayerMapping::new().method("up", move |_| late.call_super("up", &[]))
        });
        let cake = make_class_cake(vec![lonely]).unwrap();
        assert_eq!(cake.call("up", &[]).unwrap_err(), PropertyError::NoSuper(0));
    }

    // -----------------------------------------------------------------------
    // 16. Report records additions, overrides, and providers
    // -----------------------------------------------------------------------
    #[test]
    fn report_records_contributions() {
        let composition = Compositor::default()
            .compose_with_report(vec![
                constants("base-point", &[("getX", 3), ("getY", 5), ("toString", 0)]),
                constants("wobbly-point", &[("getX", 4)]),
            ])
            .unwrap();
        let report = &composition.report;
        assert_eq!(report.discipline, Discipline::Override);
        assert_eq!(report.layers.len(), 2);
        assert_eq!(report.layers[0].added, vec!["getX", "getY", "toString"]);
        assert_eq!(report.layers[1].overridden, vec!["getX"]);
        assert!(report.layers[1].added.is_empty());
        assert_eq!(report.provider_of("getX"), Some(1));
        assert_eq!(report.provider_of("getY"), Some(0));
        assert_eq!(report.provider_of("missing"), None);

        let json = serde_json::to_value(report).unwrap();
        assert_eq!(json["discipline"], json!("override"));
        assert_eq!(json["layers"][1]["name"], json!("wobbly-point"));
    }

    // -----------------------------------------------------------------------
    // 17. First-conflict reporting
    // -----------------------------------------------------------------------
    #[test]
    fn first_conflict_only() {
        let config = ComposeConfig {
            conflict_report: ConflictReport::First,
            ..ComposeConfig::traits()
        };
        let err = compose(
            config,
            vec![
                constants("a", &[("x", 1), ("y", 2)]),
                constants("b", &[("x", 3), ("y", 4)]),
            ],
        )
        .unwrap_err();
        assert_eq!(
            err,
            ComposeError::Conflict {
                index: 1,
                layer: "b".into(),
                keys: vec!["x".into()],
            }
        );
    }

    // -----------------------------------------------------------------------
    // 18. Custom strategy sets the discipline
    // -----------------------------------------------------------------------
    #[test]
    fn custom_strategy_overrides_config_discipline() {
        let compositor = Compositor::with_strategy(
            ComposeConfig::class(),
            Box::new(DisjointStrategy::new(ConflictReport::All)),
        );
        assert_eq!(compositor.config().discipline, Discipline::Disjoint);
        let err = compositor
            .compose(vec![constants("a", &[("x", 1)]), constants("b", &[("x", 2)])])
            .unwrap_err();
        assert!(err.is_conflict());
    }

    // -----------------------------------------------------------------------
    // 19. A cake does not keep itself alive through its own behaviors
    // -----------------------------------------------------------------------
    #[test]
    fn cake_is_not_self_referential() {
        let looping = layer("looping", |late| {
            let late = late.clone();
            LayerMapping::new().method("me", move |_| late.call_self("me", &[]))
        });
        let cake = make_class_cake(vec![looping]).unwrap();
        let weak = cake.downgrade();
        drop(cake);
        assert!(weak.upgrade().is_none());
    }

    // -----------------------------------------------------------------------
    // Property tests
    // -----------------------------------------------------------------------

    proptest::proptest! {
        /// Under override, every name resolves to the last layer providing it,
        /// and the cake holds exactly the union of all names.
        #[test]
        fn override_is_last_writer_wins(
            layers in proptest::collection::vec(
                proptest::collection::btree_set("[a-e]", 0..4),
                1..6,
            )
        ) {
            let producers: Vec<Box<dyn LayerProducer>> = layers
                .iter()
                .enumerate()
                .map(|(i, names)| {
                    let entries: Vec<(&str, i64)> = names.iter().map(|n| (n.as_str(), i as i64)).collect();
                    constants(&format!("layer-{i}"), &entries)
                })
                .collect();
            let cake = make_class_cake(producers).unwrap();

            let union: std::collections::BTreeSet<&String> = layers.iter().flatten().collect();
            proptest::prop_assert_eq!(cake.len(), union.len());
            for name in union {
                let last = layers.iter().rposition(|l| l.contains(name)).unwrap();
                proptest::prop_assert_eq!(cake.get(name).unwrap(), json!(last as i64));
            }
        }

        /// Under disjoint, composition succeeds exactly when no name repeats.
        #[test]
        fn disjoint_accepts_only_disjoint_layers(
            layers in proptest::collection::vec(
                proptest::collection::btree_set("[a-f]", 0..3),
                1..5,
            )
        ) {
            let producers: Vec<Box<dyn LayerProducer>> = layers
                .iter()
                .enumerate()
                .map(|(i, names)| {
                    let entries: Vec<(&str, i64)> = names.iter().map(|n| (n.as_str(), i as i64)).collect();
                    constants(&format!("layer-{i}"), &entries)
                })
                .collect();
            let total: usize = layers.iter().map(|l| l.len()).sum();
            let union: std::collections::BTreeSet<&String> = layers.iter().flatten().collect();

            match make_trait_cake(producers) {
                Ok(cake) => {
                    proptest::prop_assert_eq!(total, union.len());
                    proptest::prop_assert_eq!(cake.len(), total);
                }
                Err(err) => {
                    proptest::prop_assert!(err.is_conflict());
                    proptest::prop_assert!(total > union.len());
                }
            }
        }
    }
}
