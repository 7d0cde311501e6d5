//! spark-ndr 派生宏入口。
//!
//! # 设计意图（Why）
//! - 接口定义中的请求/响应记录多达数百个，字段顺序即线格式，手写编解码既冗长又容易错位；
//! - 将“按声明顺序逐字段编解码 + 字段形状元数据”下沉到编译期展开，保证所有记录遵循同一套规则；
//! - `size_is` 绑定在编译期确认计数字段存在，运行期校验声明计数能否承载字段值，并按声明计数写出。
//!
//! # 集成方式（How）
//! - 在记录类型上书写 `#[derive(Ndr)]`，宏会生成 `NdrEncode`、`NdrDecode` 与 `NdrRecord` 三个实现；
//! - 生成代码使用 `::spark_ndr` 绝对路径，调用方 crate 需直接依赖 `spark-ndr`；
//! - 可变长字段通过 `#[ndr(size_is = count_field)]` 指明其元素数量由哪个字段携带。

use proc_macro::TokenStream;
use quote::{format_ident, quote};
use syn::{
    Data, DeriveInput, Error, Fields, Ident, Index, Type, parse_macro_input, spanned::Spanned,
};

/// 为结构体生成 NDR 编解码实现与记录形状。
///
/// # 语义说明（What）
/// - **输入**：具名字段结构体、元组结构体或单元结构体；枚举与联合体需手写实现（判别式语义各异）。
/// - **输出**：
///   - `NdrEncode::encode`：先校验全部 `size_is` 绑定，再按声明顺序写出字段，受约束字段按声明计数写出；
///   - `NdrDecode::decode`：按声明顺序读取字段，读取完成后校验 `size_is` 绑定；
///   - `NdrRecord::SHAPE`：记录名与 `(字段名, 线类型)` 列表，供描述符与诊断使用。
/// - **前置条件**：每个字段类型都实现 `NdrEncode + NdrDecode`；`size_is` 只能引用同一结构体中的具名字段。
///
/// # 风险提示（Trade-offs）
/// - 编码期的数量不一致被视为调用方契约违规（`ShapeViolation`），解码期的不一致被视为输入畸形（`Malformed`）；
/// - 线类型字符串直接来自类型的源码书写形式，仅用于诊断展示，不参与线格式判定。
#[proc_macro_derive(Ndr, attributes(ndr))]
pub fn derive_ndr(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    expand_ndr(input)
        .unwrap_or_else(|err| err.to_compile_error())
        .into()
}

struct FieldSpec {
    /// 访问路径：具名字段为标识符，元组字段为下标。
    member: syn::Member,
    /// 解码阶段使用的局部绑定名。
    binding: Ident,
    label: String,
    ty: Type,
    size_is: Option<Ident>,
}

fn expand_ndr(input: DeriveInput) -> Result<proc_macro2::TokenStream, Error> {
    let data = match &input.data {
        Data::Struct(data) => data,
        Data::Enum(data) => {
            return Err(Error::new(
                data.enum_token.span(),
                "#[derive(Ndr)] 仅支持结构体；判别联合请手写 NdrEncode/NdrDecode",
            ));
        }
        Data::Union(data) => {
            return Err(Error::new(
                data.union_token.span(),
                "#[derive(Ndr)] 不支持 Rust union",
            ));
        }
    };

    let fields = collect_fields(&data.fields)?;
    validate_size_is(&fields)?;

    let name = &input.ident;
    let name_literal = name.to_string();
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let size_checks_encode = fields.iter().filter_map(|field| {
        let count = field.size_is.as_ref()?;
        let member = &field.member;
        let declared = declared_binding(field);
        let label = format!("{name_literal}.{}", field.label);
        Some(quote! {
            let #declared = ::spark_ndr::size_is::ensure_encoded(
                #label,
                ::spark_ndr::size_is::CountField::as_count(&self.#count),
                &self.#member,
            )?;
        })
    });
    let encode_steps = fields.iter().map(|field| {
        let member = &field.member;
        if field.size_is.is_some() {
            let declared = declared_binding(field);
            quote! { ::spark_ndr::size_is::SizedField::encode_sized(&self.#member, #declared, writer)?; }
        } else {
            quote! { ::spark_ndr::NdrEncode::encode(&self.#member, writer)?; }
        }
    });

    let decode_steps = fields.iter().map(|field| {
        let binding = &field.binding;
        let ty = &field.ty;
        quote! { let #binding: #ty = ::spark_ndr::NdrDecode::decode(reader)?; }
    });
    let size_checks_decode = fields.iter().filter_map(|field| {
        let count = field.size_is.as_ref()?;
        let count_binding = fields
            .iter()
            .find(|candidate| candidate.label == count.to_string())
            .map(|candidate| &candidate.binding)?;
        let binding = &field.binding;
        let label = format!("{name_literal}.{}", field.label);
        Some(quote! {
            ::spark_ndr::size_is::ensure_decoded(
                #label,
                ::spark_ndr::size_is::CountField::as_count(&#count_binding),
                &#binding,
                reader.position(),
            )?;
        })
    });
    let construct = match &data.fields {
        Fields::Named(_) => {
            let pairs = fields.iter().map(|field| {
                let member = &field.member;
                let binding = &field.binding;
                quote! { #member: #binding }
            });
            quote! { Self { #(#pairs),* } }
        }
        Fields::Unnamed(_) => {
            let bindings = fields.iter().map(|field| &field.binding);
            quote! { Self(#(#bindings),*) }
        }
        Fields::Unit => quote! { Self },
    };
    let min_sizes = fields.iter().map(|field| {
        let ty = &field.ty;
        quote! { + <#ty as ::spark_ndr::NdrDecode>::MIN_WIRE_SIZE }
    });

    let shape_fields = fields.iter().map(|field| {
        let label = &field.label;
        let wire_type = wire_type_literal(&field.ty);
        quote! { ::spark_ndr::FieldShape { name: #label, wire_type: #wire_type } }
    });

    let expanded = quote! {
        impl #impl_generics ::spark_ndr::NdrEncode for #name #ty_generics #where_clause {
            fn encode(
                &self,
                writer: &mut ::spark_ndr::NdrWriter,
            ) -> ::core::result::Result<(), ::spark_ndr::CodecError> {
                #(#size_checks_encode)*
                #(#encode_steps)*
                ::core::result::Result::Ok(())
            }
        }

        impl #impl_generics ::spark_ndr::NdrDecode for #name #ty_generics #where_clause {
            const MIN_WIRE_SIZE: usize = 0 #(#min_sizes)*;

            fn decode(
                reader: &mut ::spark_ndr::NdrReader,
            ) -> ::core::result::Result<Self, ::spark_ndr::CodecError> {
                #(#decode_steps)*
                #(#size_checks_decode)*
                ::core::result::Result::Ok(#construct)
            }
        }

        impl #impl_generics ::spark_ndr::NdrRecord for #name #ty_generics #where_clause {
            const SHAPE: ::spark_ndr::RecordShape = ::spark_ndr::RecordShape {
                name: #name_literal,
                fields: &[#(#shape_fields),*],
            };
        }
    };

    Ok(expanded)
}

fn collect_fields(fields: &Fields) -> Result<Vec<FieldSpec>, Error> {
    let mut specs = Vec::with_capacity(fields.len());
    for (index, field) in fields.iter().enumerate() {
        let size_is = parse_size_is(field)?;
        let (member, label) = match &field.ident {
            Some(ident) => (syn::Member::Named(ident.clone()), ident.to_string()),
            None => {
                if size_is.is_some() {
                    return Err(Error::new(
                        field.span(),
                        "#[ndr(size_is)] 需要具名字段才能引用计数字段",
                    ));
                }
                (
                    syn::Member::Unnamed(Index::from(index)),
                    index.to_string(),
                )
            }
        };
        specs.push(FieldSpec {
            member,
            binding: format_ident!("__ndr_field_{}", index),
            label,
            ty: field.ty.clone(),
            size_is,
        });
    }
    Ok(specs)
}

fn parse_size_is(field: &syn::Field) -> Result<Option<Ident>, Error> {
    let mut size_is = None;
    for attr in field.attrs.iter().filter(|attr| attr.path().is_ident("ndr")) {
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("size_is") {
                let ident: Ident = meta.value()?.parse()?;
                size_is = Some(ident);
                Ok(())
            } else {
                Err(meta.error("未知的 #[ndr] 参数，仅支持 size_is"))
            }
        })?;
    }
    Ok(size_is)
}

fn validate_size_is(fields: &[FieldSpec]) -> Result<(), Error> {
    for field in fields {
        let Some(count) = &field.size_is else {
            continue;
        };
        let count_name = count.to_string();
        if count_name == field.label {
            return Err(Error::new(count.span(), "size_is 不能引用字段自身"));
        }
        if !fields.iter().any(|candidate| candidate.label == count_name) {
            return Err(Error::new(
                count.span(),
                format!("size_is 引用的计数字段 `{count_name}` 不存在"),
            ));
        }
    }
    Ok(())
}

/// 编码阶段保存声明计数的局部绑定名。
fn declared_binding(field: &FieldSpec) -> Ident {
    format_ident!("{}_declared", field.binding)
}

fn wire_type_literal(ty: &Type) -> String {
    quote!(#ty).to_string().replace(' ', "")
}
