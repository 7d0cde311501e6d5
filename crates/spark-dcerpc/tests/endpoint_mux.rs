//! 端点多路复用测试：注册、故障映射、存根上限与上下文约束。

mod support;

use std::{sync::Arc, time::Duration};

use spark_dcerpc::{
    CallContext, Cancellation, Deadline, DispatchOutcome, Dispatcher, EndpointMux, HostConfig,
    HostError, Hresult, RegistrationError, RpcRequest, RpcResponse, ServerHandle, ServerRegistrar,
    codes, fault, monotonic_now,
};
use spark_ndr::{Bytes, NdrEncode};

use support::*;

fn stub<T: NdrEncode>(value: &T) -> Bytes {
    spark_ndr::encode(value).expect("test request must encode")
}

fn example_handle(server: Arc<dyn ExampleServer>) -> Arc<dyn ServerHandle> {
    Arc::new(Dispatcher::new(&EXAMPLE, server).expect("example table is valid"))
}

fn mux_with(server: Arc<dyn ExampleServer>, config: HostConfig) -> EndpointMux {
    let mux = EndpointMux::with_config(config);
    mux.register_server(example_handle(server))
        .expect("first registration succeeds");
    mux
}

#[tokio::test]
async fn routes_by_syntax_and_encodes_responses() {
    let mux = mux_with(Arc::new(Calculator::default()), HostConfig::default());
    assert_eq!(mux.revision(), 1);
    assert_eq!(mux.syntaxes(), vec![EXAMPLE_SYNTAX]);

    let response = mux
        .handle(RpcRequest::new(
            EXAMPLE_SYNTAX,
            3,
            stub(&PingRequest { token: 11 }),
        ))
        .await;
    assert!(!response.is_fault());
    let (ping, _) = spark_ndr::decode::<PingResponse>(response.stub).expect("ping response");
    assert_eq!(
        ping,
        PingResponse {
            token: 11,
            status: Hresult::S_OK
        }
    );

    let reserved = mux
        .handle(RpcRequest::new(EXAMPLE_SYNTAX, 4, Bytes::from_static(b"xyz")))
        .await;
    assert_eq!(reserved.status, 0);
    assert!(reserved.stub.is_empty());
}

#[tokio::test]
async fn failures_map_to_fault_statuses() {
    let mux = mux_with(Arc::new(Calculator::default()), HostConfig::default());

    let unknown_interface = mux
        .handle(RpcRequest::new(BASE_SYNTAX, 0, Bytes::new()))
        .await;
    assert_eq!(unknown_interface.status, fault::NCA_S_UNK_IF);
    assert!(unknown_interface.stub.is_empty());

    let unknown_opnum = mux
        .handle(RpcRequest::new(EXAMPLE_SYNTAX, 9, Bytes::new()))
        .await;
    assert_eq!(unknown_opnum.status, fault::NCA_S_OP_RNG_ERROR);

    let bad_stub = mux
        .handle(RpcRequest::new(EXAMPLE_SYNTAX, 3, Bytes::from_static(&[1, 2])))
        .await;
    assert_eq!(bad_stub.status, fault::RPC_X_BAD_STUB_DATA);

    let breaker = mux_with(Arc::new(ShapeBreaker), HostConfig::default());
    let bad_response = breaker
        .handle(RpcRequest::new(
            EXAMPLE_SYNTAX,
            2,
            stub(&EchoRequest {
                count: 1,
                payload: vec![9],
            }),
        ))
        .await;
    assert_eq!(bad_response.status, fault::RPC_S_INTERNAL_ERROR);

    // 单次故障不影响同一端点上的后续调用。
    let healthy = mux
        .handle(RpcRequest::new(
            EXAMPLE_SYNTAX,
            3,
            stub(&PingRequest { token: 1 }),
        ))
        .await;
    assert_eq!(healthy.status, 0);
}

#[test]
fn duplicate_registration_keeps_the_first_binding() {
    let mux = mux_with(Arc::new(Calculator::default()), HostConfig::default());
    let err = mux
        .register_server(example_handle(Arc::new(Unimplemented)))
        .expect_err("second binding for the same syntax must fail");
    assert_eq!(
        err,
        RegistrationError::AlreadyRegistered {
            syntax: EXAMPLE_SYNTAX,
            interface: "IExample",
        }
    );
    assert_eq!(err.code(), codes::REGISTRATION_DUPLICATE);
    assert_eq!(mux.revision(), 1);

    let removed = mux.deregister(&EXAMPLE_SYNTAX).expect("binding exists");
    assert_eq!(removed.syntax(), EXAMPLE_SYNTAX);
    assert!(mux.deregister(&EXAMPLE_SYNTAX).is_none());
    assert!(mux.lookup(&EXAMPLE_SYNTAX).is_none());
    assert_eq!(mux.revision(), 2);

    mux.register_server(example_handle(Arc::new(Unimplemented)))
        .expect("syntax is free again after deregistration");
}

#[tokio::test]
async fn oversized_stub_is_rejected_before_dispatch() {
    let config = HostConfig {
        max_stub_size: 8,
        ..HostConfig::default()
    };
    let mux = mux_with(Arc::new(Untouchable), config);

    let err = mux
        .try_handle(RpcRequest::new(EXAMPLE_SYNTAX, 3, Bytes::from(vec![0u8; 9])))
        .await
        .expect_err("nine bytes exceed the limit");
    assert_eq!(err, HostError::StubTooLarge { size: 9, limit: 8 });
    assert_eq!(err.fault_status(), fault::NCA_S_PROTO_ERROR);

    let at_limit = mux
        .try_handle(RpcRequest::new(EXAMPLE_SYNTAX, 4, Bytes::from(vec![0u8; 8])))
        .await;
    assert_eq!(at_limit, Ok(DispatchOutcome::NoOp));
}

#[tokio::test]
async fn cancellation_aborts_a_stalled_call() {
    let mux = mux_with(Arc::new(Stalled), HostConfig::default());
    let cancellation = Cancellation::new();
    let ctx = CallContext::builder()
        .with_cancellation(cancellation.child())
        .build();

    let canceller = tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(20)).await;
        cancellation.cancel();
    });
    let response = mux
        .handle(
            RpcRequest::new(EXAMPLE_SYNTAX, 3, stub(&PingRequest { token: 1 })).with_context(ctx),
        )
        .await;
    canceller.await.expect("canceller task completes");
    assert_eq!(response.status, fault::NCA_S_FAULT_CANCEL);
}

#[tokio::test]
async fn already_cancelled_context_fails_fast() {
    let mux = mux_with(Arc::new(Untouchable), HostConfig::default());
    let ctx = CallContext::default();
    ctx.cancellation().cancel();
    let err = mux
        .try_handle(RpcRequest::new(EXAMPLE_SYNTAX, 4, Bytes::new()).with_context(ctx))
        .await
        .expect_err("cancelled before dispatch");
    assert_eq!(err, HostError::Cancelled);
    assert_eq!(err.code(), codes::CALL_CANCELLED);
}

#[tokio::test]
async fn deadline_aborts_a_stalled_call() {
    let mux = mux_with(Arc::new(Stalled), HostConfig::default());
    let ctx = CallContext::builder()
        .with_deadline(Deadline::after(Duration::from_millis(30)))
        .build();
    let err = mux
        .try_handle(
            RpcRequest::new(EXAMPLE_SYNTAX, 3, stub(&PingRequest { token: 1 })).with_context(ctx),
        )
        .await
        .expect_err("stalled call must time out");
    assert_eq!(err, HostError::DeadlineExceeded);
    assert_eq!(err.fault_status(), fault::ERROR_TIMEOUT);

    let expired = CallContext::builder()
        .with_deadline(Deadline::at(monotonic_now()))
        .build();
    let err = mux
        .try_handle(RpcRequest::new(EXAMPLE_SYNTAX, 4, Bytes::new()).with_context(expired))
        .await
        .expect_err("expired deadline fails before dispatch");
    assert_eq!(err, HostError::DeadlineExceeded);
}

#[tokio::test]
async fn disabled_enforcement_leaves_context_to_the_handler() -> anyhow::Result<()> {
    let config = HostConfig::from_toml_str("enforce_deadlines = false")?;
    let mux = mux_with(Arc::new(Calculator::default()), config);
    let ctx = CallContext::default();
    ctx.cancellation().cancel();

    let response = mux
        .handle(
            RpcRequest::new(EXAMPLE_SYNTAX, 3, stub(&PingRequest { token: 5 })).with_context(ctx),
        )
        .await;
    assert_eq!(response.status, 0);
    let (ping, _) = spark_ndr::decode::<PingResponse>(response.stub)?;
    assert_eq!(ping.token, 5);
    Ok(())
}

#[test]
fn calls_outside_a_tokio_runtime_still_dispatch() {
    use futures::executor::block_on;

    let mux = mux_with(Arc::new(Calculator::default()), HostConfig::default());
    let reserved = block_on(mux.handle(RpcRequest::new(EXAMPLE_SYNTAX, 4, Bytes::new())));
    assert_eq!(reserved, RpcResponse::ok(Bytes::new()));

    let ping = block_on(mux.handle(RpcRequest::new(
        EXAMPLE_SYNTAX,
        3,
        stub(&PingRequest { token: 9 }),
    )));
    let (ping, _) = spark_ndr::decode::<PingResponse>(ping.stub).expect("ping decodes");
    assert_eq!(ping.token, 9);

    let ctx = CallContext::default();
    ctx.cancellation().cancel();
    let err = block_on(
        mux.try_handle(RpcRequest::new(EXAMPLE_SYNTAX, 4, Bytes::new()).with_context(ctx)),
    )
    .expect_err("cancelled context still fails before dispatch");
    assert_eq!(err, HostError::Cancelled);
}
