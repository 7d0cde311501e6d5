//! 处理器集 trait 的声明宏。

/// 声明继承 `UnknownServer` 的处理器集 trait，每个方法默认返回未实现。
///
/// 只需列出方法名与请求/响应类型，签名统一展开为
/// `async fn method(&self, ctx: CallContext, request: Req) -> Result<Resp, OperationError>`。
macro_rules! handler_set {
    (
        $(#[$meta:meta])*
        pub trait $name:ident {
            $( $(#[$method_meta:meta])* fn $method:ident($req:ty) -> $resp:ty; )*
        }
    ) => {
        $(#[$meta])*
        #[::async_trait::async_trait]
        pub trait $name: ::spark_dcom::UnknownServer {
            $(
                $(#[$method_meta])*
                async fn $method(
                    &self,
                    _ctx: ::spark_dcerpc::CallContext,
                    _request: $req,
                ) -> ::core::result::Result<$resp, ::spark_dcerpc::OperationError> {
                    ::core::result::Result::Err(::spark_dcerpc::OperationError::NotImplemented)
                }
            )*
        }
    };
}

pub(crate) use handler_set;
