#![allow(unused_imports)]

pub use planrun_test_utils::{builders, fake_executor, init_tracing, timeline, with_timeout};
