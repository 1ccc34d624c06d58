use vtl_health::notify::HealthChanged;

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Readout {
    pub text: String,
    pub fraction: f32,
}

impl Readout {
    pub fn project(change: &HealthChanged) -> Self {
        Readout {
            text: format!("Health: {}", change.current.round()),
            fraction: fraction(change.current, change.max),
        }
    }
}

pub fn fraction(current: f32, max: f32) -> f32 {
    if max.is_finite() && max > 0.0 {
        (current / max).clamp(0.0, 1.0)
    } else {
        0.0
    }
}
