//! Declaration Printer
//!
//! Renders the declaration trees of one [`ModuleOutput`] into a single
//! declaration file:
//!
//! ```typescript
//! type int = number;
//! import * as Other from "Other";
//!
//! export namespace Ns {
//!     export class Repository implements IReadable {
//!         Get(): string;
//!         readonly As_IWritable: Repository_As_IWritable;
//!     }
//! }
//! ```
//!
//! The printer never reorders anything. Declarations come out in the order
//! the engine finalized them.

use tracing::{debug, instrument};
use tsb_model::{
    ClassDecl, Declaration, EnumDecl, InterfaceDecl, IntersectionAlias, MemberDecl, MemberFlags,
    NamespaceDecl, ParameterDecl, StaticNamespaceDecl, Symbol,
};
use tsb_solver::{ModuleDependency, ModuleOutput};

/// Aliases every emitted file can rely on. Primitive aliases produced by the
/// type mapper resolve here.
pub const PRELUDE: &[&str] = &[
    "type byte = number;",
    "type sbyte = number;",
    "type short = number;",
    "type ushort = number;",
    "type int = number;",
    "type uint = number;",
    "type long = number;",
    "type ulong = number;",
    "type float = number;",
    "type double = number;",
    "type decimal = number;",
    "type char = number;",
    "type Future<T> = Promise<T>;",
    "type ptr<T> = { readonly target: T };",
    "type ref<T> = { value: T };",
];

/// Where a member is printed; decides modifiers and keywords.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum MemberSite {
    Class,
    Interface,
    Namespace,
}

pub struct DeclarationPrinter {
    output: String,
    indent_level: u32,
    indent_str: &'static str,
    prelude: bool,
}

impl Default for DeclarationPrinter {
    fn default() -> Self {
        Self::new()
    }
}

impl DeclarationPrinter {
    pub fn new() -> Self {
        Self {
            output: String::new(),
            indent_level: 0,
            indent_str: "    ",
            prelude: true,
        }
    }

    pub fn with_indent(mut self, indent_str: &'static str) -> Self {
        self.indent_str = indent_str;
        self
    }

    /// Skip the prelude aliases, for hosts that provide them globally.
    pub fn without_prelude(mut self) -> Self {
        self.prelude = false;
        self
    }

    /// Render one module.
    #[instrument(level = "debug", skip_all, fields(module = %module.module))]
    pub fn print(&mut self, module: &ModuleOutput) -> String {
        self.output.clear();
        self.indent_level = 0;

        self.write_line_text(&format!("// Declarations for module '{}'.", module.module));
        if self.prelude {
            for line in PRELUDE {
                self.write_line_text(line);
            }
        }
        for dependency in &module.dependencies {
            self.emit_import(dependency);
        }

        for namespace in &module.namespaces {
            self.write_line();
            self.emit_namespace(namespace);
        }
        debug!(bytes = self.output.len(), "module printed");
        std::mem::take(&mut self.output)
    }

    fn emit_import(&mut self, dependency: &ModuleDependency) {
        self.write_line_text(&format!(
            "import * as {} from \"{}\";",
            dependency.alias,
            escape_string(&dependency.module)
        ));
    }

    fn emit_namespace(&mut self, namespace: &NamespaceDecl) {
        // The global namespace has no block; its declarations sit at the top.
        if namespace.emitted_name.is_empty() {
            self.emit_declarations(namespace.declarations());
            return;
        }
        self.write_line_text(&format!("export namespace {} {{", namespace.emitted_name));
        self.increase_indent();
        self.emit_declarations(namespace.declarations());
        self.decrease_indent();
        self.write_line_text("}");
    }

    fn emit_declarations(&mut self, declarations: &[Declaration]) {
        for declaration in declarations {
            match declaration {
                Declaration::Class(class) => self.emit_class(class),
                Declaration::Interface(interface) => self.emit_interface(interface),
                Declaration::Enum(decl) => self.emit_enum(decl),
                Declaration::IntersectionAlias(alias) => self.emit_alias(alias),
                Declaration::StaticNamespace(ns) => self.emit_static_namespace(ns),
            }
        }
    }

    fn emit_class(&mut self, class: &ClassDecl) {
        let mut header = String::from("export ");
        if class.is_abstract {
            header.push_str("abstract ");
        }
        header.push_str("class ");
        header.push_str(&class.name);
        header.push_str(&type_parameter_list(&class.type_parameters));
        if let Some(base) = &class.base {
            header.push_str(" extends ");
            header.push_str(&base.text);
        }
        if !class.implements.is_empty() {
            header.push_str(" implements ");
            header.push_str(&join_texts(class.implements.iter().map(|t| t.text.as_str())));
        }

        let mut lines: Vec<String> = class
            .members
            .iter()
            .map(|m| member_line(m, MemberSite::Class))
            .collect();
        lines.extend(
            class
                .views
                .iter()
                .map(|view| format!("readonly {}: {};", view.property, view.type_text)),
        );
        self.emit_block(&header, &lines);

        if let Some(companion) = &class.companion {
            self.emit_static_namespace(companion);
        }
    }

    fn emit_interface(&mut self, interface: &InterfaceDecl) {
        // Diamond bases are reachable only through their aliases.
        let mut header = if interface.diamond_base {
            String::new()
        } else {
            String::from("export ")
        };
        header.push_str("interface ");
        header.push_str(&interface.name);
        header.push_str(&type_parameter_list(&interface.type_parameters));
        if !interface.extends.is_empty() {
            header.push_str(" extends ");
            header.push_str(&join_texts(interface.extends.iter().map(|t| t.text.as_str())));
        }
        let lines: Vec<String> = interface
            .members
            .iter()
            .map(|m| member_line(m, MemberSite::Interface))
            .collect();
        self.emit_block(&header, &lines);

        if let Some(companion) = &interface.companion {
            self.emit_static_namespace(companion);
        }
    }

    fn emit_enum(&mut self, decl: &EnumDecl) {
        let lines: Vec<String> = decl
            .members
            .iter()
            .map(|m| format!("{} = {},", m.emitted_name, m.value))
            .collect();
        self.emit_block(&format!("export enum {}", decl.name), &lines);
    }

    fn emit_alias(&mut self, alias: &IntersectionAlias) {
        let constituents: Vec<&str> = alias.constituents.iter().map(|c| c.text.as_str()).collect();
        self.write_line_text(&format!(
            "export type {}{} = {};",
            alias.name,
            type_parameter_list(&alias.type_parameters),
            constituents.join(" & ")
        ));
    }

    fn emit_static_namespace(&mut self, ns: &StaticNamespaceDecl) {
        let lines: Vec<String> = ns
            .members
            .iter()
            .map(|m| member_line(m, MemberSite::Namespace))
            .collect();
        self.emit_block(&format!("export namespace {}", ns.name), &lines);
    }

    fn emit_block(&mut self, header: &str, lines: &[String]) {
        if lines.is_empty() {
            self.write_line_text(&format!("{header} {{}}"));
            return;
        }
        self.write_line_text(&format!("{header} {{"));
        self.increase_indent();
        for line in lines {
            self.write_line_text(line);
        }
        self.decrease_indent();
        self.write_line_text("}");
    }

    fn write(&mut self, s: &str) {
        self.output.push_str(s);
    }

    fn write_line(&mut self) {
        self.output.push('\n');
    }

    fn write_indent(&mut self) {
        for _ in 0..self.indent_level {
            self.output.push_str(self.indent_str);
        }
    }

    fn write_line_text(&mut self, text: &str) {
        self.write_indent();
        self.write(text);
        self.write_line();
    }

    const fn increase_indent(&mut self) {
        self.indent_level += 1;
    }

    const fn decrease_indent(&mut self) {
        if self.indent_level > 0 {
            self.indent_level -= 1;
        }
    }
}

fn member_line(member: &MemberDecl, site: MemberSite) -> String {
    let name = member.name();
    let flags = member.symbol.flags();
    let mut line = String::new();

    if site == MemberSite::Namespace {
        line.push_str("export ");
        match &member.symbol {
            Symbol::Method(_) => line.push_str("function "),
            Symbol::Field(_) | Symbol::Property(_) if is_readonly(&member.symbol) => {
                line.push_str("const ");
            }
            _ => line.push_str("let "),
        }
    } else if site == MemberSite::Class {
        if flags.contains(MemberFlags::STATIC) || flags.contains(MemberFlags::CONST) {
            line.push_str("static ");
        }
        if flags.contains(MemberFlags::ABSTRACT) {
            line.push_str("abstract ");
        }
    }

    match &member.symbol {
        Symbol::Constructor(_) => {
            line.push_str("constructor(");
            line.push_str(&parameter_list(&member.parameters));
            line.push_str(");");
        }
        Symbol::Method(_) => {
            line.push_str(name);
            line.push_str(&type_parameter_list(&member.type_parameters));
            line.push('(');
            line.push_str(&parameter_list(&member.parameters));
            line.push_str("): ");
            line.push_str(&member.ty);
            line.push(';');
        }
        Symbol::Property(p) if p.is_indexer() && site != MemberSite::Namespace => {
            if is_readonly(&member.symbol) {
                line.push_str("readonly ");
            }
            line.push('[');
            line.push_str(&parameter_list(&member.parameters));
            line.push_str("]: ");
            line.push_str(&member.ty);
            line.push(';');
        }
        Symbol::Field(_) | Symbol::Property(_) | Symbol::Event(_) => {
            if site != MemberSite::Namespace && is_readonly(&member.symbol) {
                line.push_str("readonly ");
            }
            line.push_str(name);
            line.push_str(": ");
            line.push_str(&member.ty);
            line.push(';');
        }
    }
    line
}

fn is_readonly(symbol: &Symbol) -> bool {
    match symbol {
        Symbol::Field(f) => f.flags.intersects(MemberFlags::READONLY | MemberFlags::CONST),
        Symbol::Property(p) => p.flags.contains(MemberFlags::READONLY) || !p.has_setter,
        _ => false,
    }
}

fn parameter_list(parameters: &[ParameterDecl]) -> String {
    let rendered: Vec<String> = parameters
        .iter()
        .map(|p| {
            let rest = if p.rest { "..." } else { "" };
            let optional = if p.optional && !p.rest { "?" } else { "" };
            format!("{rest}{}{optional}: {}", p.name, p.ty)
        })
        .collect();
    rendered.join(", ")
}

fn type_parameter_list(parameters: &[String]) -> String {
    if parameters.is_empty() {
        String::new()
    } else {
        format!("<{}>", parameters.join(", "))
    }
}

fn join_texts<'a>(texts: impl Iterator<Item = &'a str>) -> String {
    texts.collect::<Vec<_>>().join(", ")
}

fn escape_string(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '"' => escaped.push_str("\\\""),
            '\\' => escaped.push_str("\\\\"),
            _ => escaped.push(c),
        }
    }
    escaped
}

#[cfg(test)]
#[path = "tests/printer_tests.rs"]
mod tests;
