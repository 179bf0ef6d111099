pub mod answer_mapper;
pub mod codec;
pub mod error_reply;
pub mod validator;

pub use answer_mapper::{parse_record_type, type_mnemonic, AnswerMapper};
pub use codec::MessageCodec;
pub use error_reply::ErrorTranslator;
pub use validator::{MessageValidator, MAX_RECORD_TTL};
