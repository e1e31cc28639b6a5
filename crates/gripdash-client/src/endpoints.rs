//! Typed wrappers for every backend route.
//!
//! Each wrapper builds the request, runs it through the retrying
//! [`ApiClient::call`], and decodes the JSON into the matching response
//! type. Client-side validation (port ranges, parameter ranges) runs first
//! and short-circuits with [`ApiError::Validation`] before any network
//! traffic.

use serde::de::DeserializeOwned;
use serde_json::Value;

use gripdash_core::{validate_output_port, validate_output_value, Param, ParamKind};

use crate::client::{ApiClient, ApiRequest};
use crate::error::{ApiError, ApiResult};
use crate::transport::ApiTransport;
use crate::types::{
    Ack, ConnectionStatusResponse, DigitalOutputResponse, IndicatorResponse,
    ModbusConnectedResponse, ModbusStatusResponse, ParamReadResponse, ReadAllStatusResponse,
};

fn decode<R: DeserializeOwned>(value: Value) -> ApiResult<R> {
    serde_json::from_value(value).map_err(|e| ApiError::Decode(e.to_string()))
}

/// Render a parameter value the way the backend's form parser expects:
/// integers without a decimal point.
fn format_value(param: Param, value: f64) -> String {
    match param.kind() {
        ParamKind::Int => format!("{}", value as i64),
        ParamKind::Float => value.to_string(),
    }
}

impl<T: ApiTransport> ApiClient<T> {
    /// GET `/get_connection_status` - device link status.
    pub async fn connection_status(&self) -> ApiResult<ConnectionStatusResponse> {
        decode(self.call(&ApiRequest::get("/get_connection_status")).await?)
    }

    /// GET `/check_modbus_connected` - cheap Modbus link boolean.
    pub async fn modbus_connected(&self) -> ApiResult<ModbusConnectedResponse> {
        decode(self.call(&ApiRequest::get("/check_modbus_connected")).await?)
    }

    /// GET `/check_modbus_status` - Modbus health with probe text.
    pub async fn modbus_status(&self) -> ApiResult<ModbusStatusResponse> {
        decode(self.call(&ApiRequest::get("/check_modbus_status")).await?)
    }

    /// POST `/disconnect` - force the backend to drop the device link.
    pub async fn disconnect(&self) -> ApiResult<Ack> {
        decode(self.call(&ApiRequest::post_form("/disconnect", vec![])).await?)
    }

    /// GET `/read_all_status` - bulk parameter snapshot.
    pub async fn read_all_status(&self) -> ApiResult<ReadAllStatusResponse> {
        decode(self.call(&ApiRequest::get("/read_all_status")).await?)
    }

    /// POST `/set_digital_output`.
    pub async fn set_digital_output(&self, output: u8, value: u8) -> ApiResult<Ack> {
        validate_output_port(output)?;
        validate_output_value(value)?;
        let form = vec![
            ("output_number".to_string(), output.to_string()),
            ("value".to_string(), value.to_string()),
        ];
        decode(
            self.call(&ApiRequest::post_form("/set_digital_output", form))
                .await?,
        )
    }

    /// GET `/get_digital_output?output_number=`.
    pub async fn digital_output(&self, output: u8) -> ApiResult<DigitalOutputResponse> {
        validate_output_port(output)?;
        let query = vec![("output_number".to_string(), output.to_string())];
        decode(
            self.call(&ApiRequest::get_with_query("/get_digital_output", query))
                .await?,
        )
    }

    /// POST `/set_modbus_indicator_digital_output` - select which port
    /// mirrors Modbus health.
    pub async fn set_indicator_output(&self, output: u8) -> ApiResult<Ack> {
        validate_output_port(output)?;
        let form = vec![("output_number".to_string(), output.to_string())];
        decode(
            self.call(&ApiRequest::post_form(
                "/set_modbus_indicator_digital_output",
                form,
            ))
            .await?,
        )
    }

    /// GET `/get_modbus_indicator_digital_output`.
    pub async fn indicator_output(&self) -> ApiResult<IndicatorResponse> {
        decode(
            self.call(&ApiRequest::get("/get_modbus_indicator_digital_output"))
                .await?,
        )
    }

    /// POST `/write_<param>` with the parameter's form field.
    ///
    /// Validates the value against the parameter's range first; pulse
    /// commands without a value go through [`Self::gripper_init`] instead.
    pub async fn write_param(&self, param: Param, value: f64) -> ApiResult<Ack> {
        param.validate(value)?;
        let Some(field) = param.field() else {
            // validate() already rejects valueless params; kept as a guard.
            return Err(ApiError::Validation(format!(
                "{} does not carry a value",
                param.name()
            )));
        };

        let form = vec![(field.to_string(), format_value(param, value))];
        let path = format!("/write_{}", param.name());
        decode(self.call(&ApiRequest::post_form(path, form)).await?)
    }

    /// POST `/write_gripper_init` - initialization pulse (the backend
    /// writes 1 and auto-resets to 0 half a second later).
    pub async fn gripper_init(&self) -> ApiResult<Ack> {
        decode(
            self.call(&ApiRequest::post_form("/write_gripper_init", vec![]))
                .await?,
        )
    }

    /// GET `/read_<param>`.
    pub async fn read_param(&self, param: Param) -> ApiResult<ParamReadResponse> {
        if !param.readable() {
            return Err(gripdash_core::CoreError::NotReadable {
                param: param.name(),
            }
            .into());
        }
        let path = format!("/read_{}", param.name());
        decode(self.call(&ApiRequest::get(path)).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::MockApiTransport;
    use serde_json::json;

    fn client_expecting_no_calls() -> ApiClient<MockApiTransport> {
        let mut transport = MockApiTransport::new();
        transport.expect_get().never();
        transport.expect_post_form().never();
        ApiClient::new(transport)
    }

    #[tokio::test]
    async fn out_of_range_write_makes_no_network_call() {
        let client = client_expecting_no_calls();
        let err = client.write_param(Param::GripperId, 300.0).await.unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));
    }

    #[tokio::test]
    async fn invalid_output_port_makes_no_network_call() {
        let client = client_expecting_no_calls();
        assert!(matches!(
            client.set_digital_output(0, 1).await,
            Err(ApiError::Validation(_))
        ));
        assert!(matches!(
            client.digital_output(17).await,
            Err(ApiError::Validation(_))
        ));
        assert!(matches!(
            client.set_digital_output(3, 2).await,
            Err(ApiError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn unreadable_param_is_rejected_locally() {
        let client = client_expecting_no_calls();
        assert!(matches!(
            client.read_param(Param::ResetRotation).await,
            Err(ApiError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn write_param_posts_the_mapped_field() {
        let mut transport = MockApiTransport::new();
        transport
            .expect_post_form()
            .withf(|path, form| {
                path == "/write_rotation_stop_sensitivity"
                    && form == [("sensitivity".to_string(), "85".to_string())]
            })
            .times(1)
            .returning(|_, _| Ok(json!({"success": true, "message": "写入成功"})));

        let client = ApiClient::new(transport);
        let ack = client
            .write_param(Param::RotationStopSensitivity, 85.0)
            .await
            .unwrap();
        assert!(ack.success);
    }

    #[tokio::test]
    async fn float_params_keep_their_fraction() {
        let mut transport = MockApiTransport::new();
        transport
            .expect_post_form()
            .withf(|path, form| {
                path == "/write_clamping_position"
                    && form == [("position".to_string(), "12.5".to_string())]
            })
            .times(1)
            .returning(|_, _| Ok(json!({"success": true, "message": "写入成功"})));

        let client = ApiClient::new(transport);
        client
            .write_param(Param::ClampingPosition, 12.5)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn digital_output_read_decodes_value() {
        let mut transport = MockApiTransport::new();
        transport
            .expect_get()
            .withf(|path, query| {
                path == "/get_digital_output"
                    && query == [("output_number".to_string(), "2".to_string())]
            })
            .times(1)
            .returning(|_, _| Ok(json!({"success": true, "value": 1, "status_text": "ON"})));

        let client = ApiClient::new(transport);
        let response = client.digital_output(2).await.unwrap();
        assert_eq!(response.value, Some(1));
    }
}
