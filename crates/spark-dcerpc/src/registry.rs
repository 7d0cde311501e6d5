//! 操作注册表：操作号 → {继承、保留、活动} 的静态映射。
//!
//! # 设计背景（Why）
//! - 接口定义按声明顺序为操作编号，编号即线上契约；派生接口的编号紧接在基接口之后；
//! - 协议中存在为扩展预留或已废弃的槽位，它们必须占住编号却永远不触达应用代码；
//! - 每个操作的请求/响应类型在编译期已知，因此注册表是由函数指针组成的 `static` 表，
//!   既无运行期反射，也无逐调用分配。
//!
//! # 结构说明（How）
//! - [`OperationDescriptor`]：编号、线名与 [`OperationKind`]（活动操作附带请求/响应形状）；
//! - [`OperationEntry`]：描述符加上活动操作的调用函数指针，只能经由两个 `const fn` 构造，
//!   保证“活动 ⇔ 有调用函数”；
//! - [`InterfaceTable`]：接口身份、可选的 [`BaseInterface`] 与本接口自有操作切片；
//! - [`InterfaceDescriptor`]：与服务端 trait 无关的对象安全视图，派生接口借此得知基接口的操作数量。
//!
//! # 契约说明（What）
//! - 自有操作编号必须从基接口操作数开始连续递增，由 [`InterfaceDescriptor::validate`] 校验；
//! - [`InterfaceTable::resolve`] 为 O(1)：基接口范围内直接返回委派目标，其余按下标索引。

use spark_ndr::RecordShape;

use crate::{
    contract::CallContext,
    dispatch::DispatchResult,
    error::{DispatchError, InterfaceDefinitionError},
    future::BoxFuture,
    sealed::Sealed,
    syntax::SyntaxId,
};
use bytes::Bytes;

/// 活动操作的调用函数：解码、调用处理器、编码。
pub type Invoke<S> = for<'a> fn(&'a S, CallContext, Bytes) -> BoxFuture<'a, DispatchResult>;

/// 基接口委派函数：以原操作号与原始存根转交基接口分发器。
pub type Delegate<S> =
    for<'a> fn(&'a S, CallContext, u16, Bytes) -> BoxFuture<'a, DispatchResult>;

/// 操作种类标签。
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OperationKind {
    Active {
        request: &'static RecordShape,
        response: &'static RecordShape,
    },
    /// 协议保留槽位：分发结果恒为无操作。
    Reserved,
}

/// 单个操作号的静态描述。
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct OperationDescriptor {
    pub opnum: u16,
    pub name: &'static str,
    pub kind: OperationKind,
}

impl OperationDescriptor {
    pub fn is_reserved(&self) -> bool {
        matches!(self.kind, OperationKind::Reserved)
    }

    pub fn request_shape(&self) -> Option<&'static RecordShape> {
        match self.kind {
            OperationKind::Active { request, .. } => Some(request),
            OperationKind::Reserved => None,
        }
    }

    pub fn response_shape(&self) -> Option<&'static RecordShape> {
        match self.kind {
            OperationKind::Active { response, .. } => Some(response),
            OperationKind::Reserved => None,
        }
    }
}

/// 操作表条目。
pub struct OperationEntry<S: ?Sized + 'static> {
    descriptor: OperationDescriptor,
    invoke: Option<Invoke<S>>,
}

impl<S: ?Sized + 'static> OperationEntry<S> {
    pub const fn active(
        opnum: u16,
        name: &'static str,
        request: &'static RecordShape,
        response: &'static RecordShape,
        invoke: Invoke<S>,
    ) -> Self {
        Self {
            descriptor: OperationDescriptor {
                opnum,
                name,
                kind: OperationKind::Active { request, response },
            },
            invoke: Some(invoke),
        }
    }

    pub const fn reserved(opnum: u16, name: &'static str) -> Self {
        Self {
            descriptor: OperationDescriptor {
                opnum,
                name,
                kind: OperationKind::Reserved,
            },
            invoke: None,
        }
    }

    pub fn descriptor(&self) -> &OperationDescriptor {
        &self.descriptor
    }
}

/// 基接口绑定：基接口描述与委派函数。
pub struct BaseInterface<S: ?Sized + 'static> {
    descriptor: &'static dyn InterfaceDescriptor,
    pub(crate) delegate: Delegate<S>,
}

impl<S: ?Sized + 'static> BaseInterface<S> {
    pub const fn new(descriptor: &'static dyn InterfaceDescriptor, delegate: Delegate<S>) -> Self {
        Self {
            descriptor,
            delegate,
        }
    }

    pub fn descriptor(&self) -> &'static dyn InterfaceDescriptor {
        self.descriptor
    }
}

/// 操作号解析结果。
pub enum Resolution<'t, S: ?Sized + 'static> {
    /// 落在基接口范围内，原样委派。
    Inherited(&'t BaseInterface<S>),
    Reserved(&'t OperationDescriptor),
    Active {
        descriptor: &'t OperationDescriptor,
        invoke: Invoke<S>,
    },
}

/// 一个 RPC 接口的静态操作表，`S` 为该接口的处理器集 trait 对象类型。
pub struct InterfaceTable<S: ?Sized + 'static> {
    name: &'static str,
    syntax: SyntaxId,
    base: Option<BaseInterface<S>>,
    operations: &'static [OperationEntry<S>],
}

impl<S: ?Sized + 'static> InterfaceTable<S> {
    /// 无基接口的根接口表。
    pub const fn root(
        name: &'static str,
        syntax: SyntaxId,
        operations: &'static [OperationEntry<S>],
    ) -> Self {
        Self {
            name,
            syntax,
            base: None,
            operations,
        }
    }

    /// 继承自 `base` 的派生接口表。
    pub const fn derived(
        name: &'static str,
        syntax: SyntaxId,
        base: BaseInterface<S>,
        operations: &'static [OperationEntry<S>],
    ) -> Self {
        Self {
            name,
            syntax,
            base: Some(base),
            operations,
        }
    }

    pub fn base(&self) -> Option<&BaseInterface<S>> {
        self.base.as_ref()
    }

    /// 解析操作号。
    pub fn resolve(&self, opnum: u16) -> Result<Resolution<'_, S>, DispatchError> {
        let base_count = match &self.base {
            Some(base) => {
                let count = base.descriptor.operation_count();
                if opnum < count {
                    return Ok(Resolution::Inherited(base));
                }
                count
            }
            None => 0,
        };
        let entry = self
            .operations
            .get(usize::from(opnum - base_count))
            .ok_or_else(|| DispatchError::UnknownOperation {
                interface: self.name,
                opnum,
                operation_count: self.operation_count(),
            })?;
        Ok(match entry.invoke {
            Some(invoke) => Resolution::Active {
                descriptor: &entry.descriptor,
                invoke,
            },
            None => Resolution::Reserved(&entry.descriptor),
        })
    }
}

/// 接口描述的对象安全视图。
///
/// # 契约说明（What）
/// - `operation_count` 为包含全部基接口在内的扁平化操作数；
/// - `descriptor(opnum)` 沿基接口链查找，范围外返回 `None`；
/// - `validate` 检查名称非空、自有编号连续且起始于基接口操作数，并递归检查基接口。
pub trait InterfaceDescriptor: Send + Sync + Sealed {
    fn name(&self) -> &'static str;

    fn syntax(&self) -> SyntaxId;

    fn base_descriptor(&self) -> Option<&'static dyn InterfaceDescriptor>;

    fn own_operation_count(&self) -> usize;

    /// 自有操作的第 `index` 项（从 0 开始，不含基接口）。
    fn own_operation(&self, index: usize) -> Option<&OperationDescriptor>;

    fn base_count(&self) -> u16 {
        self.base_descriptor()
            .map_or(0, |base| base.operation_count())
    }

    fn operation_count(&self) -> u16 {
        let own = u16::try_from(self.own_operation_count()).unwrap_or(u16::MAX);
        self.base_count().saturating_add(own)
    }

    fn descriptor(&self, opnum: u16) -> Option<&OperationDescriptor> {
        let base_count = self.base_count();
        if opnum < base_count {
            return self
                .base_descriptor()
                .and_then(|base| base.descriptor(opnum));
        }
        self.own_operation(usize::from(opnum - base_count))
    }

    /// 扁平化的全部操作描述（含基接口），按操作号升序。
    fn operations(&self) -> Vec<&OperationDescriptor> {
        (0..self.operation_count())
            .filter_map(|opnum| self.descriptor(opnum))
            .collect()
    }

    fn validate(&self) -> Result<(), InterfaceDefinitionError> {
        if self.name().is_empty() {
            return Err(InterfaceDefinitionError::EmptyName);
        }
        if let Some(base) = self.base_descriptor() {
            base.validate()?;
        }
        let base_count = usize::from(self.base_count());
        if base_count + self.own_operation_count() > usize::from(u16::MAX) {
            return Err(InterfaceDefinitionError::OpnumOverflow {
                interface: self.name(),
            });
        }
        for index in 0..self.own_operation_count() {
            let Some(operation) = self.own_operation(index) else {
                continue;
            };
            let expected = (base_count + index) as u16;
            if operation.opnum != expected {
                return Err(InterfaceDefinitionError::NonContiguousOpnum {
                    interface: self.name(),
                    expected,
                    found: operation.opnum,
                });
            }
        }
        Ok(())
    }
}

impl<S: ?Sized + 'static> InterfaceDescriptor for InterfaceTable<S> {
    fn name(&self) -> &'static str {
        self.name
    }

    fn syntax(&self) -> SyntaxId {
        self.syntax
    }

    fn base_descriptor(&self) -> Option<&'static dyn InterfaceDescriptor> {
        self.base.as_ref().map(|base| base.descriptor)
    }

    fn own_operation_count(&self) -> usize {
        self.operations.len()
    }

    fn own_operation(&self, index: usize) -> Option<&OperationDescriptor> {
        self.operations.get(index).map(OperationEntry::descriptor)
    }
}
