// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Compiled-in predictors, so the binary can serve something without any
//! external module.
//!
//! | Reference                    | Kind     | Output        |
//! |------------------------------|----------|---------------|
//! | `builtins/echo.rs:Echo`      | class    | `str`         |
//! | `builtins/counter.rs:Counter`| class    | `Iterator[int]` |
//! | `builtins/shout.rs:shout`    | function | `str`         |

mod counter;
mod echo;
mod shout;

pub use counter::Counter;
pub use echo::Echo;
pub use shout::Shout;

use std::sync::Arc;

use crate::loader::RegistryHost;
use crate::traits::{LoadedModule, Predictor, Symbol};

pub const ECHO_MODULE: &str = "builtins/echo.rs";
pub const COUNTER_MODULE: &str = "builtins/counter.rs";
pub const SHOUT_MODULE: &str = "builtins/shout.rs";

fn echo_class() -> Symbol {
    Symbol::Class(Arc::new(|| Ok(Box::new(Echo::default()) as Box<dyn Predictor>)))
}

fn counter_class() -> Symbol {
    Symbol::Class(Arc::new(|| Ok(Box::new(Counter) as Box<dyn Predictor>)))
}

/// Host serving the built-in modules.
///
/// The echo module also offers a slim form holding only the `Echo` class.
pub fn builtin_host() -> RegistryHost {
    let mut host = RegistryHost::new();
    host.register_with_slim(
        ECHO_MODULE,
        |_ctx| Ok(LoadedModule::new("echo").with_symbol("Echo", echo_class())),
        |symbol, _mode, _ctx| {
            Ok((symbol == "Echo").then(|| LoadedModule::new("echo").with_symbol("Echo", echo_class())))
        },
    );
    host.register(COUNTER_MODULE, |_ctx| {
        Ok(LoadedModule::new("counter").with_symbol("Counter", counter_class()))
    });
    host.register(SHOUT_MODULE, |_ctx| {
        Ok(LoadedModule::new("shout").with_symbol("shout", Symbol::Function(Arc::new(Shout))))
    });
    host
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::predictor::{Output, PredictionContext};
    use crate::schema::{Mode, SchemaDeriver};
    use serde_json::{json, Map, Value};

    fn payload(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_builtin_modules_are_registered() {
        assert_eq!(
            builtin_host().modules(),
            vec![COUNTER_MODULE, ECHO_MODULE, SHOUT_MODULE]
        );
    }

    #[tokio::test]
    async fn test_echo_repeats() {
        let mut echo = Echo::default();
        echo.setup(None).await.unwrap();
        let (input, _) = SchemaDeriver::default()
            .derive(&echo.predict_signature(), Mode::Predict)
            .unwrap();

        let inputs = input.validate(&payload(json!({"text": "hi", "count": 3}))).unwrap();
        let output = echo.predict(inputs, PredictionContext::detached()).await.unwrap();
        assert_eq!(output.collect().await.unwrap(), vec![json!("hi hi hi")]);
    }

    #[tokio::test]
    async fn test_echo_requires_setup() {
        let echo = Echo::default();
        let (input, _) = SchemaDeriver::default()
            .derive(&echo.predict_signature(), Mode::Predict)
            .unwrap();
        let inputs = input.validate(&payload(json!({"text": "hi"}))).unwrap();
        assert!(echo.predict(inputs, PredictionContext::detached()).await.is_err());
    }

    #[tokio::test]
    async fn test_counter_streams() {
        let (input, output_schema) = SchemaDeriver::default()
            .derive(&Counter.predict_signature(), Mode::Predict)
            .unwrap();
        assert!(output_schema.is_streaming());

        let inputs = input.validate(&payload(json!({"n": 4}))).unwrap();
        let output = Counter.predict(inputs, PredictionContext::detached()).await.unwrap();
        assert!(matches!(output, Output::Stream(_)));
        assert_eq!(
            output.collect().await.unwrap(),
            vec![json!(0), json!(1), json!(2), json!(3)]
        );
    }

    #[tokio::test]
    async fn test_shout_styles() {
        use crate::traits::PredictFn;

        let (input, _) = SchemaDeriver::default()
            .derive(&Shout.signature(), Mode::Predict)
            .unwrap();

        let cases = vec![
            (json!({"text": "hello there"}), "HELLO THERE"),
            (json!({"text": "Hello There", "style": "lower"}), "hello there"),
            (json!({"text": "hello there", "style": "title"}), "Hello There"),
        ];
        for (raw, expected) in cases {
            let inputs = input.validate(&payload(raw)).unwrap();
            let output = Shout.call(inputs, PredictionContext::detached()).await.unwrap();
            assert_eq!(output.collect().await.unwrap(), vec![json!(expected)]);
        }

        assert!(input
            .validate(&payload(json!({"text": "x", "style": "sideways"})))
            .is_err());
    }
}
