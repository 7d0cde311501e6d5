//! ORPC 请求/响应记录的声明宏。

/// 成对声明 ORPC 操作的请求与响应记录。
///
/// 请求首字段固定为 `this: OrpcThis`，响应首字段固定为 `that: OrpcThat`、
/// 末字段固定为 `return_value: Hresult`；两者派生 `Ndr`，响应同时实现
/// `OperationResponse`，失败形态为“其余字段取默认值、`return_value` 为失败状态”。
///
/// ```ignore
/// spark_dcom::orpc_records! {
///     /// GetVolumeDeviceName
///     GetVolumeDeviceNameRequest { volume_id: i64 }
///         => GetVolumeDeviceNameResponse {
///             volume_device_length: u32,
///             #[ndr(size_is = volume_device_length)]
///             volume_device: String,
///         };
/// }
/// ```
#[macro_export]
macro_rules! orpc_records {
    ($(
        $(#[$meta:meta])*
        $request:ident { $( $(#[$req_attr:meta])* $req_field:ident : $req_ty:ty ),* $(,)? }
            => $response:ident { $( $(#[$resp_attr:meta])* $resp_field:ident : $resp_ty:ty ),* $(,)? }
    );* $(;)?) => {
        $(
            $(#[$meta])*
            #[derive(Clone, Debug, Default, PartialEq, $crate::__private::Ndr)]
            pub struct $request {
                pub this: $crate::OrpcThis,
                $( $(#[$req_attr])* pub $req_field: $req_ty, )*
            }

            $(#[$meta])*
            #[derive(Clone, Debug, Default, PartialEq, $crate::__private::Ndr)]
            pub struct $response {
                pub that: $crate::OrpcThat,
                $( $(#[$resp_attr])* pub $resp_field: $resp_ty, )*
                pub return_value: $crate::__private::Hresult,
            }

            impl $crate::__private::OperationResponse for $response {
                fn from_failure(status: $crate::__private::Hresult) -> Self {
                    Self {
                        return_value: status,
                        ..::core::default::Default::default()
                    }
                }
            }
        )*
    };
}
