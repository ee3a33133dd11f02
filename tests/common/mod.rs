#![allow(unused_imports)]

pub use clusterbench_test_utils::builders;
pub use clusterbench_test_utils::fake_launcher;
pub use clusterbench_test_utils::{init_tracing, with_timeout};
