//! ArgsCodec - Task と位置引数リストの相互変換
//!
//! tuple struct は JSON 配列にシリアライズされるので、配列の要素をそのまま位置引数にします。
//! それ以外（newtype の中身、struct など）は 1 つの引数になります。

use serde_json::Value;

use super::task::Task;

#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    #[error("encode {task_type}: {source}")]
    Encode {
        task_type: &'static str,
        source: serde_json::Error,
    },

    #[error("decode {task_type}: {source}")]
    Decode {
        task_type: &'static str,
        source: serde_json::Error,
    },
}

pub struct ArgsCodec;

impl ArgsCodec {
    pub fn encode<T: Task>(task: &T) -> Result<Vec<Value>, CodecError> {
        let value = serde_json::to_value(task).map_err(|source| CodecError::Encode {
            task_type: T::TYPE,
            source,
        })?;
        Ok(match value {
            Value::Array(args) => args,
            single => vec![single],
        })
    }

    pub fn decode<T: Task>(args: &[Value]) -> Result<T, CodecError> {
        let decoded = match args {
            // newtype は中身そのもの。1 要素の tuple struct なら配列として読み直す
            [single] => serde_json::from_value(single.clone())
                .or_else(|_| serde_json::from_value(Value::Array(args.to_vec()))),
            _ => serde_json::from_value(Value::Array(args.to_vec())),
        };
        decoded.map_err(|source| CodecError::Decode {
            task_type: T::TYPE,
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::{Deserialize, Serialize};
    use serde_json::json;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Ping(String);

    impl Task for Ping {
        const TYPE: &'static str = "test.ping.v1";
    }

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Pair(String, u32);

    impl Task for Pair {
        const TYPE: &'static str = "test.pair.v1";
    }

    #[test]
    fn newtype_is_a_single_argument() {
        let args = ArgsCodec::encode(&Ping("hello".into())).unwrap();
        assert_eq!(args, vec![json!("hello")]);
        assert_eq!(ArgsCodec::decode::<Ping>(&args).unwrap(), Ping("hello".into()));
    }

    #[test]
    fn tuple_struct_spreads_into_positional_arguments() {
        let args = ArgsCodec::encode(&Pair("a@example.com".into(), 7)).unwrap();
        assert_eq!(args, vec![json!("a@example.com"), json!(7)]);
        assert_eq!(
            ArgsCodec::decode::<Pair>(&args).unwrap(),
            Pair("a@example.com".into(), 7)
        );
    }

    #[test]
    fn wrong_arity_is_a_decode_error() {
        let err = ArgsCodec::decode::<Pair>(&[json!("only one")]).unwrap_err();
        assert!(matches!(err, CodecError::Decode { task_type: "test.pair.v1", .. }));
    }
}
