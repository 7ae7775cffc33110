//! Small reusable egui widgets

use dolly_core::Vec3;
use std::ops::RangeInclusive;

/// A labelled row of three drag values. Returns true if any component changed.
pub fn vec3_drag(
    ui: &mut egui::Ui,
    label: &str,
    value: &mut Vec3,
    speed: f64,
    range: Option<RangeInclusive<f32>>,
) -> bool {
    let mut changed = false;
    ui.horizontal(|ui| {
        ui.label(label);
        for component in [&mut value.x, &mut value.y, &mut value.z] {
            let mut drag = egui::DragValue::new(component).speed(speed).max_decimals(3);
            if let Some(range) = &range {
                drag = drag.range(range.clone());
            }
            changed |= ui.add(drag).changed();
        }
    });
    changed
}
