//! A small indentation-tracking string templater, in the same spirit as
//! the teacher's own `protobuf-codegen::code_writer` module: callers never
//! manage indentation themselves, they nest closures and the writer keeps
//! braces balanced.

pub struct CodeWriter {
    buf: String,
    indent: usize,
}

impl CodeWriter {
    pub fn new() -> CodeWriter {
        CodeWriter {
            buf: String::new(),
            indent: 0,
        }
    }

    pub fn finish(self) -> String {
        self.buf
    }

    pub fn write_line(&mut self, line: &str) {
        if line.is_empty() {
            self.buf.push('\n');
            return;
        }
        for _ in 0..self.indent {
            self.buf.push_str("    ");
        }
        self.buf.push_str(line);
        self.buf.push('\n');
    }

    pub fn indented(&mut self, cb: impl FnOnce(&mut CodeWriter)) {
        self.indent += 1;
        cb(self);
        self.indent -= 1;
    }

    /// Writes `prefix {`, runs `cb` indented, then `}` — the shape every
    /// other block helper below is built on.
    pub fn block(&mut self, prefix: &str, cb: impl FnOnce(&mut CodeWriter)) {
        self.write_line(&format!("{} {{", prefix));
        self.indented(cb);
        self.write_line("}");
    }

    /// Like [`block`](Self::block) but the closing brace carries a
    /// trailing `;` — for `match` arms used as the tail expression of a
    /// `let` binding, for instance.
    pub fn block_semi(&mut self, prefix: &str, cb: impl FnOnce(&mut CodeWriter)) {
        self.write_line(&format!("{} {{", prefix));
        self.indented(cb);
        self.write_line("};");
    }

    pub fn pub_fn(&mut self, sig: &str, cb: impl FnOnce(&mut CodeWriter)) {
        self.block(&format!("pub fn {}", sig), cb);
    }

    pub fn def_fn(&mut self, sig: &str, cb: impl FnOnce(&mut CodeWriter)) {
        self.block(&format!("fn {}", sig), cb);
    }

    pub fn pub_struct(&mut self, name: &str, cb: impl FnOnce(&mut CodeWriter)) {
        self.block(&format!("pub struct {}", name), cb);
    }

    pub fn pub_enum(&mut self, name: &str, cb: impl FnOnce(&mut CodeWriter)) {
        self.block(&format!("pub enum {}", name), cb);
    }

    pub fn impl_self_block(&mut self, type_name: &str, cb: impl FnOnce(&mut CodeWriter)) {
        self.block(&format!("impl {}", type_name), cb);
    }

    pub fn impl_for_block(
        &mut self,
        trait_name: &str,
        type_name: &str,
        cb: impl FnOnce(&mut CodeWriter),
    ) {
        self.block(&format!("impl {} for {}", trait_name, type_name), cb);
    }

    pub fn match_block(&mut self, expr: &str, cb: impl FnOnce(&mut CodeWriter)) {
        self.block(&format!("match {}", expr), cb);
    }

    pub fn case_block(&mut self, pattern: &str, cb: impl FnOnce(&mut CodeWriter)) {
        self.write_line(&format!("{} => {{", pattern));
        self.indented(cb);
        self.write_line("}");
    }

    pub fn if_stmt(&mut self, cond: &str, cb: impl FnOnce(&mut CodeWriter)) {
        self.block(&format!("if {}", cond), cb);
    }

    pub fn if_let_stmt(&mut self, pattern: &str, expr: &str, cb: impl FnOnce(&mut CodeWriter)) {
        self.block(&format!("if let {} = {}", pattern, expr), cb);
    }

    pub fn while_block(&mut self, cond: &str, cb: impl FnOnce(&mut CodeWriter)) {
        self.block(&format!("while {}", cond), cb);
    }

    pub fn field_entry(&mut self, name: &str, value: &str) {
        self.write_line(&format!("{}: {},", name, value));
    }

    pub fn pub_field_decl(&mut self, name: &str, ty: &str) {
        self.write_line(&format!("pub {}: {},", name, ty));
    }

    pub fn derive(&mut self, traits: &[&str]) {
        self.write_line(&format!("#[derive({})]", traits.join(", ")));
    }

    pub fn allow(&mut self, lints: &[&str]) {
        self.write_line(&format!("#[allow({})]", lints.join(", ")));
    }

    /// A `//` line comment, used for implementation notes that shouldn't
    /// surface in rustdoc.
    pub fn comment(&mut self, text: &str) {
        self.write_line(&format!("// {}", text));
    }

    /// A `///` doc comment; multi-line doc strings are split one `///` per
    /// source line so they render the way the original `.proto` doc
    /// comment did.
    pub fn doc_comment(&mut self, text: &str) {
        for line in text.lines() {
            self.write_line(&format!("/// {}", line));
        }
    }
}

impl Default for CodeWriter {
    fn default() -> Self {
        CodeWriter::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn block_indents_nested_content() {
        let mut w = CodeWriter::new();
        w.pub_fn("foo() -> i32", |w| {
            w.write_line("let x = 1;");
            w.if_stmt("x > 0", |w| {
                w.write_line("return x;");
            });
        });
        let out = w.finish();
        assert_eq!(
            "pub fn foo() -> i32 {\n    let x = 1;\n    if x > 0 {\n        return x;\n    }\n}\n",
            out
        );
    }

    #[test]
    fn match_and_case_block_render_arms() {
        let mut w = CodeWriter::new();
        w.match_block("self", |w| {
            w.case_block("Foo::A", |w| {
                w.write_line("1");
            });
        });
        let out = w.finish();
        assert_eq!(
            "match self {\n    Foo::A => {\n        1\n    }\n}\n",
            out
        );
    }

    #[test]
    fn derive_and_struct_fields() {
        let mut w = CodeWriter::new();
        w.derive(&["Debug", "Clone"]);
        w.pub_struct("Foo", |w| {
            w.pub_field_decl("a", "i32");
        });
        assert_eq!(
            "#[derive(Debug, Clone)]\npub struct Foo {\n    pub a: i32,\n}\n",
            w.finish()
        );
    }
}
