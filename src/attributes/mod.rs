//! Built-in vertex attribute kinds and operations
//!
//! Every kind follows the same pattern: `load` inspects the bound source
//! once per pipeline build, decides between the direct array, a lazy
//! per-vertex push, or a derivation from other attributes, and caches
//! whatever `operate` will need; `operate` then runs per vertex against the
//! cached references only.

mod color;
mod light_coord;
mod lighting;
mod normal;
mod side;
mod transform;

pub use color::ColorAttribute;
pub use light_coord::LightCoordAttribute;
pub use lighting::LightingAttribute;
pub use normal::NormalAttribute;
pub use side::SideAttribute;
pub use transform::MatrixTransform;

use std::sync::Arc;

use crate::registry::{RegistryBuilder, StandardAttributes};

/// Reserve and install the built-in kinds on a registry under construction.
/// Reservation happens up front so the mutually dependent kinds can hold
/// each other's identities.
pub(crate) fn install_standard(builder: &mut RegistryBuilder) -> StandardAttributes {
    let (color, color_op) = builder.reserve_attribute();
    let (lighting, lighting_op) = builder.reserve_attribute();
    let (normal, normal_op) = builder.reserve_attribute();
    let (side, side_op) = builder.reserve_attribute();
    let (light_coord, light_coord_op) = builder.reserve_attribute();
    let transform = builder.register_operation();

    builder.install(Arc::new(ColorAttribute::new(color, color_op)));
    builder.install(Arc::new(LightingAttribute::new(lighting, lighting_op, color)));
    builder.install(Arc::new(NormalAttribute::new(normal, normal_op, side)));
    builder.install(Arc::new(SideAttribute::new(side, side_op, normal)));
    builder.install(Arc::new(LightCoordAttribute::new(
        light_coord,
        light_coord_op,
        side,
        transform,
    )));

    StandardAttributes {
        color,
        lighting,
        normal,
        side,
        light_coord,
        transform,
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use crate::registry::Registry;

    #[test]
    fn array_factories_produce_typed_storage() {
        let registry = Registry::new();
        let std = registry.standard();

        let normals = registry.attribute(std.normal).new_array(4);
        let normals = normals
            .downcast::<Vec<glam::Vec3>>()
            .expect("normal storage is Vec<Vec3>");
        assert_eq!(normals.len(), 4);

        let colors = registry.attribute(std.color).new_array(3);
        assert_eq!(
            Arc::clone(&colors)
                .downcast::<Vec<u32>>()
                .expect("color storage is Vec<u32>")
                .len(),
            3
        );

        let sides = registry.attribute(std.side).new_array(2);
        assert!(sides.downcast::<Vec<u8>>().is_ok());
    }
}
