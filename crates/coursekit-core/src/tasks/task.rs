//! Task trait - 型付き Task の定義
//!
//! # 学習ポイント
//! - Associated Constants (`const TYPE`)
//! - 引数は位置引数のリストとしてブローカーに載る（`ArgsCodec`）

use serde::Serialize;
use serde::de::DeserializeOwned;

/// Task は task_type と引数の型を対応付ける
///
/// ```ignore
/// #[derive(Serialize, Deserialize)]
/// struct SendResetEmail(String, String); // (email, reset_url)
///
/// impl Task for SendResetEmail {
///     const TYPE: &'static str = "accounts.email.password_reset.v1";
/// }
/// ```
///
/// 引数は id や文字列などの素の値だけにします（接続やハンドルは載せない）。
/// - tuple struct: フィールドごとに 1 引数
/// - newtype: 1 引数
pub trait Task: Serialize + DeserializeOwned + Send + Sync + 'static {
    /// `{domain}.{channel}.{action}.v{major}`
    const TYPE: &'static str;
}
