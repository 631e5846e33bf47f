use jsonrpsee::types::{error::ErrorObject, ErrorObjectOwned};
use pylon_pool::PipelineError;
use pylon_primitives::constants::rpc_error_codes;
use serde_json::json;

/// Wrapper mapping pipeline failures onto JSON-RPC error objects.
pub struct JsonRpcError(pub ErrorObjectOwned);

impl From<PipelineError> for JsonRpcError {
    fn from(err: PipelineError) -> Self {
        let object = match &err {
            PipelineError::Validation(validation) => ErrorObject::owned(
                rpc_error_codes::VALIDATION,
                validation.to_string(),
                Some(json!({ "field": validation.field })),
            ),
            PipelineError::Storage(storage) => ErrorObject::owned(
                rpc_error_codes::STORAGE,
                storage.to_string(),
                None::<bool>,
            ),
            PipelineError::Submission(submission) => ErrorObject::owned(
                rpc_error_codes::SUBMISSION,
                submission.to_string(),
                None::<bool>,
            ),
        };
        Self(object)
    }
}

impl From<JsonRpcError> for ErrorObjectOwned {
    fn from(err: JsonRpcError) -> Self {
        err.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pylon_pool::StorageError;
    use pylon_primitives::{ValidationError, ValidationErrorKind};
    use pylon_relayer::SubmissionError;

    #[test]
    fn validation_errors_map_to_invalid_params_with_field_data() {
        let err = PipelineError::Validation(ValidationError {
            field: "accountGasLimits",
            reason: ValidationErrorKind::BadLength { expected: 32, got: 2 },
        });
        let object = ErrorObjectOwned::from(JsonRpcError::from(err));
        assert_eq!(object.code(), rpc_error_codes::VALIDATION);
        assert!(object.message().contains("accountGasLimits"));
        let data: serde_json::Value =
            serde_json::from_str(object.data().unwrap().get()).unwrap();
        assert_eq!(data["field"], "accountGasLimits");
    }

    #[test]
    fn storage_and_submission_errors_keep_their_own_codes() {
        let storage = PipelineError::Storage(StorageError::Unavailable { inner: "io".into() });
        assert_eq!(
            ErrorObjectOwned::from(JsonRpcError::from(storage)).code(),
            rpc_error_codes::STORAGE
        );

        let submission = PipelineError::Submission(SubmissionError::Timeout {
            call: "eth_sendRawTransaction",
        });
        assert_eq!(
            ErrorObjectOwned::from(JsonRpcError::from(submission)).code(),
            rpc_error_codes::SUBMISSION
        );
    }
}
