pub mod api_response;
pub mod validated_wrapper;
pub mod validator_utils;
