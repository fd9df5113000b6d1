//! Signature - handler の「形」の宣言と検証
//!
//! # 学習ポイント
//! - リフレクションの代わりに、handler 自身が自分の形（Signature）を宣言する
//! - `TypedHandler<E, H>` はジェネリクスから正しい Signature を自動で作る
//! - 手書きの `DynHandler` 実装は validate() で起動時に検証される
//!
//! # 検証ルール（この順で、最初の失敗だけを報告）
//! 0. 関数であること
//! 1. 引数 2 つ・戻り値 2 つ
//! 2. 第 1 引数が Context
//! 3. 第 2 引数が構造化レコード → accepted type になる
//! 4. 第 1 戻り値が構造化レコード
//! 5. 第 2 戻り値が Error

use std::fmt;

use super::event::{EventType, Record};
use crate::domain::errors::ValidationError;

/// Signature の 1 要素
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Slot {
    /// cancellation / deadline capability (`Context`)
    Context,
    /// error-result capability
    Error,
    /// 参照 / Box 越しに渡される構造化レコード
    Record(EventType),
    /// それ以外（プリミティブ、trait object、値渡しの struct など）
    Value(&'static str),
}

impl Slot {
    /// 構造化レコード（`Record` を実装した型だけ）
    ///
    /// ```compile_fail
    /// use demux_core::typed::Slot;
    ///
    /// let _ = Slot::record::<usize>();
    /// ```
    pub fn record<T: Record>() -> Self {
        Self::Record(EventType::of::<T>())
    }

    /// レコードではない型（型名だけ持つ）
    pub fn value<T: ?Sized>() -> Self {
        Self::Value(std::any::type_name::<T>())
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Context => f.write_str("Context"),
            Self::Error => f.write_str("Error"),
            Self::Record(event_type) => write!(f, "&{event_type}"),
            Self::Value(name) => f.write_str(name),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Signature {
    Function { inputs: Vec<Slot>, outputs: Vec<Slot> },
    /// 呼び出せないもの（型名だけ持つ）
    NotCallable(&'static str),
}

impl Signature {
    pub fn function(
        inputs: impl IntoIterator<Item = Slot>,
        outputs: impl IntoIterator<Item = Slot>,
    ) -> Self {
        Self::Function {
            inputs: inputs.into_iter().collect(),
            outputs: outputs.into_iter().collect(),
        }
    }

    /// 正しい形: `fn(Context, &E) -> (&O, Error)`
    pub fn handler(event_type: EventType, output_type: EventType) -> Self {
        Self::function(
            [Slot::Context, Slot::Record(event_type)],
            [Slot::Record(output_type), Slot::Error],
        )
    }

    /// 検証して accepted type（第 2 引数のレコード型）を返す
    pub fn validate(&self) -> Result<EventType, ValidationError> {
        let (inputs, outputs) = match self {
            Self::Function { inputs, outputs } => (inputs, outputs),
            Self::NotCallable(_) => return Err(ValidationError::NotCallable(self.clone())),
        };

        let ([first_arg, second_arg], [first_ret, second_ret]) =
            (inputs.as_slice(), outputs.as_slice())
        else {
            return Err(ValidationError::Arity(self.clone()));
        };

        if *first_arg != Slot::Context {
            return Err(ValidationError::FirstArgument(self.clone()));
        }
        let Slot::Record(accepted) = second_arg else {
            return Err(ValidationError::SecondArgument(self.clone()));
        };
        if !matches!(first_ret, Slot::Record(_)) {
            return Err(ValidationError::FirstReturn(self.clone()));
        }
        if *second_ret != Slot::Error {
            return Err(ValidationError::SecondReturn(self.clone()));
        }

        Ok(*accepted)
    }
}

fn write_list(f: &mut fmt::Formatter<'_>, slots: &[Slot]) -> fmt::Result {
    for (i, slot) in slots.iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{slot}")?;
    }
    Ok(())
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotCallable(name) => f.write_str(name),
            Self::Function { inputs, outputs } => {
                f.write_str("fn(")?;
                write_list(f, inputs)?;
                f.write_str(")")?;
                match outputs.as_slice() {
                    [] => Ok(()),
                    [single] => write!(f, " -> {single}"),
                    many => {
                        f.write_str(" -> (")?;
                        write_list(f, many)?;
                        f.write_str(")")
                    }
                }
            }
        }
    }
}
