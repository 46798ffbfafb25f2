use crate::domain::model::{GeneratedArtifact, GenerationMode, TestGroup};
use std::path::PathBuf;

pub const GENERATED_BANNER: &str =
    "// THIS FILE IS AUTO-GENERATED. DO NOT EDIT!!!\n// See `utgen --help` for details\n\n\n";

#[derive(Debug, Clone, PartialEq)]
pub struct GroupArtifacts {
    pub declaration: GeneratedArtifact,
    pub definition: GeneratedArtifact,
}

/// 由掃描結果產生 `<ID>_GROUP.h` 與 `<ID>_GROUP.c`
///
/// The name table and the function table are emitted from the same slice in
/// one pass each, so index `i` of both always refers to the same test.
#[derive(Debug, Clone)]
pub struct GroupGenerator {
    mode: GenerationMode,
}

impl GroupGenerator {
    pub fn new(mode: GenerationMode) -> Self {
        Self { mode }
    }

    pub fn generate(&self, group: &TestGroup) -> GroupArtifacts {
        let manifest = group.manifest_name();
        let dir = PathBuf::from(&group.package);

        GroupArtifacts {
            declaration: GeneratedArtifact {
                path: dir.join(format!("{}.h", manifest)),
                contents: self.declaration(group),
            },
            definition: GeneratedArtifact {
                path: dir.join(format!("{}.c", manifest)),
                contents: self.definition(group),
            },
        }
    }

    fn declaration(&self, group: &TestGroup) -> String {
        let include_guard = format!("{}_H", group.manifest_name().replace('.', "_").to_uppercase());
        let mut out = String::new();

        out.push_str(&format!("#ifndef {}\n", include_guard));
        out.push_str(&format!("#define {}\n\n", include_guard));
        out.push_str("#include <stdbool.h>\n");
        out.push_str("#include \"../test_group.h\"\n\n\n");

        for test in &group.tests {
            out.push_str(&format!("bool {}();\n", test));
        }

        out.push_str(&format!("\nextern test_group_t {};\n\n\n", group.symbol()));
        out.push_str("#endif\n");
        out
    }

    fn definition(&self, group: &TestGroup) -> String {
        let package = &group.package;
        let symbol = group.symbol();
        let mut out = String::from(GENERATED_BANNER);

        out.push_str("#include \"test.h\"\n");
        out.push_str("#include \"../test_group.h\"\n");
        out.push_str(&format!("#include \"{}.h\"\n\n\n", group.manifest_name()));
        out.push_str("#include <stdbool.h>\n");
        if self.mode == GenerationMode::Standalone {
            out.push_str("#include <stdio.h>\n");
        }
        out.push_str("\n\n");

        // test function name mapping
        out.push_str(&format!("char *{}_test_function_names[] = {{\n", package));
        for test in &group.tests {
            out.push_str(&format!("\t\"{}\",\n", test));
        }
        out.push_str("};\n\n");

        out.push_str(&format!("test_function {}_tests_to_run[] = {{\n", package));
        for test in &group.tests {
            out.push_str(&format!("\t{},\n", test));
        }
        out.push_str("};\n\n\n");

        out.push_str(&format!("test_group_t {} = {{\n", symbol));
        out.push_str(&format!("\t.funcs = &{}_tests_to_run[0],\n", package));
        out.push_str(&format!("\t.func_names = &{}_test_function_names[0],\n", package));
        out.push_str(&format!("\t.num_tests = {},\n", group.len()));
        out.push_str(&format!("\t.group_name = \"{}\"\n", symbol));
        out.push_str("};\n\n\n");

        if self.mode == GenerationMode::Standalone {
            out.push_str(&runner(&symbol));
        }

        out
    }
}

/// 獨立執行檔的進入點；有任何測試失敗時回傳非零
fn runner(symbol: &str) -> String {
    format!(
        r#"int main(void)
{{
	int failures = 0;

	printf("\033[94mRunning test group: %s\033[0m\n", {symbol}.group_name);
	printf("--------------------------------------------------------\n");

	for(int i = 0; i < {symbol}.num_tests; i++)
	{{
		bool result = {symbol}.funcs[i]();

		if(result)
		{{
			printf("\tTest %d \033[92mPASSED\033[0m in function \"%s\" ...\n", i, {symbol}.func_names[i]);
		}}
		else
		{{
			printf("\tTest %d \033[91mFAILED\033[0m in function \"%s\" ...\n", i, {symbol}.func_names[i]);
			failures++;
		}}
	}}

	printf("--------------------------------------------------------\n\n");

	return failures == 0 ? 0 : 1;
}}
"#
    )
}
