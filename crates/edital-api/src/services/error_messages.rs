//! User-facing (pt-BR) messages for pipeline failures.
//!
//! Provider bodies and internal details never reach the client; the message
//! is chosen from the failure class only.

use edital_core::Error;
use edital_inference::{classify, FailureKind};

pub const OVERLOADED: &str =
    "O serviço de IA está sobrecarregado no momento. Aguarde alguns instantes e tente novamente.";
pub const RATE_LIMITED: &str =
    "Limite de requisições ao serviço de IA atingido. Aguarde um minuto e tente novamente.";
pub const MISSING_API_KEY: &str =
    "O serviço de IA não está configurado (chave de API ausente ou inválida). Contate o administrador.";
pub const MALFORMED_RESPONSE: &str =
    "A IA retornou uma resposta em formato inesperado. Tente novamente.";
pub const GENERIC: &str = "Não foi possível concluir a análise com IA. Tente novamente mais tarde.";
pub const NO_USABLE_CONTEXT: &str =
    "Nenhum documento válido ou análise anterior foi encontrado para este processo.";
pub const NO_FILES: &str = "Informe ao menos um arquivo para análise.";

/// Localized message for a failure that surfaced from the pipeline.
pub fn user_message(err: &Error) -> &'static str {
    if let Error::NoUsableContext(_) = err {
        return NO_USABLE_CONTEXT;
    }
    match classify(err) {
        FailureKind::Overloaded => OVERLOADED,
        FailureKind::RateLimited => RATE_LIMITED,
        FailureKind::MissingApiKey => MISSING_API_KEY,
        FailureKind::MalformedResponse => MALFORMED_RESPONSE,
        FailureKind::Other => GENERIC,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_by_failure_class() {
        assert_eq!(user_message(&Error::generation(Some(503), "x")), OVERLOADED);
        assert_eq!(user_message(&Error::generation(Some(429), "x")), RATE_LIMITED);
        assert_eq!(
            user_message(&Error::Config("Gemini API key is not configured".into())),
            MISSING_API_KEY
        );
        assert_eq!(
            user_message(&Error::MalformedResponse {
                message: "eof".into(),
                dump_path: None
            }),
            MALFORMED_RESPONSE
        );
        assert_eq!(user_message(&Error::Internal("boom".into())), GENERIC);
        assert_eq!(
            user_message(&Error::NoUsableContext("none".into())),
            NO_USABLE_CONTEXT
        );
    }

    #[test]
    fn test_raw_provider_text_is_not_leaked() {
        let err = Error::generation(Some(500), "internal stack trace at foo.rs:12");
        assert!(!user_message(&err).contains("foo.rs"));
    }
}
