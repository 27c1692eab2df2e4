//! Point layers used by the demonstrations.

use std::cell::Cell;

use cake_core::{layer, LayerProducer};
use cake_types::{expect_number, LayerMapping, Value};

use crate::cli::Shape;

/// Stack the layers for a point of the given shape.
pub fn point_layers(shape: Shape, x: i64, y: i64, wobble: f64) -> Vec<Box<dyn LayerProducer>> {
    match shape {
        Shape::Class => vec![base_point_layer(x, y), wobbly_point_layer(wobble)],
        Shape::Trait => vec![abstract_point_layer(x, y), trait_wobble_layer(wobble)],
    }
}

/// `getX`, `getY`, and a `toString` that reads both through self.
pub fn base_point_layer(x: i64, y: i64) -> Box<dyn LayerProducer> {
    layer("base-point", move |late| {
        let this = late.clone();
        LayerMapping::new()
            .method("getX", move |_| Ok(Value::from(x)))
            .method("getY", move |_| Ok(Value::from(y)))
            .method("toString", move |_| {
                let x = this.call_self("getX", &[])?;
                let y = this.call_self("getY", &[])?;
                Ok(Value::String(format!("<{x},{y}>")))
            })
    })
}

/// Overrides `getX`: super's `getX` plus a wobble that grows by one per call.
pub fn wobbly_point_layer(wobble: f64) -> Box<dyn LayerProducer> {
    layer("wobbly-point", move |late| {
        let supr = late.clone();
        let wobble = Cell::new(wobble);
        LayerMapping::new().method("getX", move |_| {
            let x = expect_number(&supr.call_super("getX", &[])?, "getX")?;
            Ok(Value::from(x + bump(&wobble)))
        })
    })
}

/// Like the base point, but leaves `getX` to a later layer.
pub fn abstract_point_layer(x: i64, y: i64) -> Box<dyn LayerProducer> {
    layer("abstract-point", move |late| {
        let this = late.clone();
        LayerMapping::new()
            .method("baseGetX", move |_| Ok(Value::from(x)))
            .method("getY", move |_| Ok(Value::from(y)))
            .method("toString", move |_| {
                let x = this.call_self("getX", &[])?;
                let y = this.call_self("getY", &[])?;
                Ok(Value::String(format!("<{x},{y}>")))
            })
    })
}

/// Supplies `getX` as self's `baseGetX` plus a growing wobble.
pub fn trait_wobble_layer(wobble: f64) -> Box<dyn LayerProducer> {
    layer("trait-wobble", move |late| {
        let this = late.clone();
        let wobble = Cell::new(wobble);
        LayerMapping::new().method("getX", move |_| {
            let x = expect_number(&this.call_self("baseGetX", &[])?, "getX")?;
            Ok(Value::from(x + bump(&wobble)))
        })
    })
}

// Post-increment.
fn bump(wobble: &Cell<f64>) -> f64 {
    let current = wobble.get();
    wobble.set(current + 1.0);
    current
}
