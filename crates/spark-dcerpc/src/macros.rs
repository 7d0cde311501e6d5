//! 接口表声明宏。
//!
//! 逐操作的解码/调用/编码三元组是同一模式的机械重复，这里用声明宏展开为 `static` 表项：
//! 每个活动操作生成一个单态化的调用函数，保留槽位只生成描述符。

/// 声明接口的自有操作切片。
///
/// ```ignore
/// pub static EXAMPLE_OPERATIONS: &[OperationEntry<dyn ExampleServer>] = spark_dcerpc::operation_table! {
///     interface: "IExample",
///     server: ExampleServer,
///     operations: [
///         (3, "Ping", ping, PingRequest => PingResponse),
///         (4, reserved "Reserved_Opnum4"),
///         (5, "Sum", sum, SumRequest => SumResponse),
///     ],
/// };
/// ```
///
/// - `server` 为处理器集 trait 的路径，生成的调用函数接收 `&(dyn Trait + 'static)`；
/// - 操作号必须显式书写，并与声明顺序一致，注册时由 `validate` 复核连续性。
#[macro_export]
macro_rules! operation_table {
    (
        interface: $iface:literal,
        server: $server:path,
        operations: [ $( $entry:tt ),* $(,)? ] $(,)?
    ) => {
        &[ $( $crate::__operation_entry!($iface, $server, $entry) ),* ]
    };
}

#[doc(hidden)]
#[macro_export]
macro_rules! __operation_entry {
    ($iface:literal, $server:path, ($opnum:literal, reserved $name:literal)) => {
        $crate::registry::OperationEntry::reserved($opnum, $name)
    };
    (
        $iface:literal,
        $server:path,
        ($opnum:literal, $name:literal, $method:ident, $req:ty => $resp:ty)
    ) => {
        $crate::registry::OperationEntry::active(
            $opnum,
            $name,
            &<$req as $crate::__private::NdrRecord>::SHAPE,
            &<$resp as $crate::__private::NdrRecord>::SHAPE,
            {
                fn invoke<'a>(
                    server: &'a (dyn $server + 'static),
                    ctx: $crate::CallContext,
                    stub: $crate::__private::Bytes,
                ) -> $crate::BoxFuture<'a, $crate::DispatchResult> {
                    $crate::dispatch::invoke_operation::<$req, $resp>(
                        $crate::OperationSite {
                            interface: $iface,
                            operation: $name,
                            opnum: $opnum,
                        },
                        stub,
                        move |request| server.$method(ctx, request),
                    )
                }
                invoke
            },
        )
    };
}

/// 声明派生接口对基接口的绑定。
///
/// `base` 为基接口表的 `static` 路径；生成的委派函数把派生 trait 对象向上转型为基 trait 对象，
/// 以原操作号与原始存根调用基接口表的分发。
#[macro_export]
macro_rules! base_interface {
    (base: $base:path, server: $server:path $(,)?) => {
        $crate::registry::BaseInterface::new(&$base, {
            fn delegate<'a>(
                server: &'a (dyn $server + 'static),
                ctx: $crate::CallContext,
                opnum: u16,
                stub: $crate::__private::Bytes,
            ) -> $crate::BoxFuture<'a, $crate::DispatchResult> {
                $base.dispatch(server, ctx, opnum, stub)
            }
            delegate
        })
    };
}
