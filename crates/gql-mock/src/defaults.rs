use rand::Rng;

use crate::{MockValue, TypeMocks};

/// Mocks for the built-in scalars, consulted when nothing else provides a value.
pub(crate) fn scalar_defaults() -> TypeMocks {
    TypeMocks::new()
        .with(
            "Int",
            MockValue::resolver(|_| rand::thread_rng().gen_range(-100_i64..=100).into()),
        )
        .with(
            "Float",
            MockValue::resolver(|_| rand::thread_rng().gen_range(-100.0_f64..100.0).into()),
        )
        .with("String", "Hello World")
        .with("Boolean", MockValue::resolver(|_| rand::thread_rng().gen_bool(0.5).into()))
        .with("ID", MockValue::resolver(|_| uuid::Uuid::new_v4().to_string().into()))
}
