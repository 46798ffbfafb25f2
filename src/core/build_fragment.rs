use crate::domain::model::{group_manifest_name, test_source_name, GeneratedArtifact, GenerationMode};
use std::path::PathBuf;

/// 產生每個套件的 sub-make 檔 (`<id>/tests.mk`)
///
/// The fragment never embeds the production source list: it asks the tool for
/// it at make time, so `add-source-file` takes effect without regenerating.
#[derive(Debug, Clone)]
pub struct BuildFragmentGenerator {
    file_name: String,
    tool_command: String,
    mode: GenerationMode,
}

impl BuildFragmentGenerator {
    pub fn new(file_name: &str, tool_command: &str, mode: GenerationMode) -> Self {
        Self {
            file_name: file_name.to_string(),
            tool_command: tool_command.to_string(),
            mode,
        }
    }

    pub fn generate(&self, package: &str) -> GeneratedArtifact {
        let mut contents = self.header(package);
        contents.push_str(&self.targets());

        GeneratedArtifact {
            path: PathBuf::from(package).join(&self.file_name),
            contents,
        }
    }

    fn header(&self, package: &str) -> String {
        let group_name = group_manifest_name(package);
        let test_source = test_source_name(package);
        let tool = &self.tool_command;

        format!(
            r#"

# CC, CFLAGS, OBJ_DIR, SUBTARGET and SHELL
# are all exported from top-level Makefile


CURRENT_DIR={package}
TEST_GROUP_NAME={group_name}
TEST_GROUP_FILE=$(TEST_GROUP_NAME).c
TEST_GROUP_HEADER=$(TEST_GROUP_NAME).h

INCLUDE_DIRS=..

PKG_OBJ_DIR=../$(OBJ_DIR)/$(CURRENT_DIR)




###########################################
# Production sources come from registry  #
###########################################

PKG_SRCS=$(shell {tool} --dir .. get-source-file-paths $(CURRENT_DIR))

# object paths mirror the absolute source path, so equal file names never collide
PKG_OBJS = $(patsubst /%.c, $(PKG_OBJ_DIR)/src/%.o, $(abspath $(PKG_SRCS)))




#########################
# Add source files here #
#########################

SRCS =	{test_source}			\
		$(TEST_GROUP_FILE)


TEST_OBJS = $(patsubst %.c, $(PKG_OBJ_DIR)/%.o, $(SRCS))
OBJS = $(TEST_OBJS) $(PKG_OBJS)




########################
# Targets for sub-make #
########################

.PHONY: clean setup


"#
        )
    }

    fn targets(&self) -> String {
        let mut out = String::new();

        match self.mode {
            GenerationMode::Combined => {
                out.push_str("$(SUBTARGET): setup $(OBJS)\n\n\n");
            }
            GenerationMode::Standalone => {
                out.push_str("$(SUBTARGET): setup $(PKG_OBJ_DIR)/$(CURRENT_DIR)_main\n\n");
                out.push_str("# link package objects and test objects into one executable\n");
                out.push_str("$(PKG_OBJ_DIR)/$(CURRENT_DIR)_main: $(OBJS)\n");
                out.push_str("\t$(CC) $(CFLAGS) $^ -o $@\n\n\n");
            }
        }

        out.push_str("# create subfolder in object file folder for this folder's object files\n");
        out.push_str("setup:\n");
        out.push_str("\tif [ ! -d $(PKG_OBJ_DIR) ]; then mkdir -p $(PKG_OBJ_DIR); fi\n\n");

        out.push_str("$(TEST_OBJS): $(PKG_OBJ_DIR)/%.o: %.c\n");
        out.push_str("\t$(CC) $(CFLAGS) -I$(INCLUDE_DIRS) -c $< -o $@\n\n");

        out.push_str("$(PKG_OBJS): $(PKG_OBJ_DIR)/src/%.o: /%.c\n");
        out.push_str("\tmkdir -p $(dir $@)\n");
        out.push_str("\t$(CC) $(CFLAGS) -I$(INCLUDE_DIRS) -c $< -o $@\n\n\n\n");

        out.push_str("clean:\n");
        out.push_str("\tif [ -e $(TEST_GROUP_FILE) ]; then rm $(TEST_GROUP_FILE); fi\n");
        out.push_str("\tif [ -e $(TEST_GROUP_HEADER) ]; then rm $(TEST_GROUP_HEADER); fi\n");
        out.push_str("\trm -f $(OBJS)\n");
        if self.mode == GenerationMode::Standalone {
            out.push_str("\trm -f $(PKG_OBJ_DIR)/$(CURRENT_DIR)_main\n");
        }
        out.push_str("\n\n\n");

        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn generator(mode: GenerationMode) -> BuildFragmentGenerator {
        BuildFragmentGenerator::new("tests.mk", "$(GEN_TEST_SCRIPT)", mode)
    }

    #[test]
    fn test_fragment_path_and_identity() {
        let artifact = generator(GenerationMode::Combined).generate("io");
        assert_eq!(artifact.path, PathBuf::from("io/tests.mk"));
        assert!(artifact.contents.contains("CURRENT_DIR=io\n"));
        assert!(artifact.contents.contains("TEST_GROUP_NAME=IO_GROUP\n"));
        assert!(artifact.contents.contains("SRCS =\ttest_io.c"));
    }

    #[test]
    fn test_sources_resolved_through_registry_query() {
        let artifact = generator(GenerationMode::Combined).generate("io");
        assert!(artifact.contents.contains(
            "PKG_SRCS=$(shell $(GEN_TEST_SCRIPT) --dir .. get-source-file-paths $(CURRENT_DIR))"
        ));
        assert!(!artifact.contents.contains("uart"));
    }

    #[test]
    fn test_lifecycle_targets() {
        let contents = generator(GenerationMode::Combined).generate("io").contents;
        assert!(contents.contains(".PHONY: clean setup"));
        assert!(contents.contains("\nsetup:\n"));
        assert!(contents.contains("\nclean:\n"));
        assert!(contents.contains("$(SUBTARGET): setup $(OBJS)"));
        assert!(!contents.contains("_main"));
    }

    #[test]
    fn test_standalone_links_package_executable() {
        let contents = generator(GenerationMode::Standalone).generate("io").contents;
        assert!(contents.contains("$(SUBTARGET): setup $(PKG_OBJ_DIR)/$(CURRENT_DIR)_main"));
        assert!(contents.contains("$(PKG_OBJ_DIR)/$(CURRENT_DIR)_main: $(OBJS)\n\t$(CC) $(CFLAGS) $^ -o $@"));
    }

    #[test]
    fn test_package_objects_keep_source_directories() {
        let contents = generator(GenerationMode::Combined).generate("io").contents;
        assert!(contents.contains(
            "PKG_OBJS = $(patsubst /%.c, $(PKG_OBJ_DIR)/src/%.o, $(abspath $(PKG_SRCS)))"
        ));
        assert!(contents.contains(
            "$(PKG_OBJS): $(PKG_OBJ_DIR)/src/%.o: /%.c\n\tmkdir -p $(dir $@)\n"
        ));
        assert!(contents.contains("$(TEST_OBJS): $(PKG_OBJ_DIR)/%.o: %.c\n"));
        assert!(!contents.contains("notdir"));
        assert!(!contents.contains("vpath"));
    }

    #[test]
    fn test_custom_tool_command() {
        let contents = BuildFragmentGenerator::new("tests.mk", "utgen", GenerationMode::Combined)
            .generate("io")
            .contents;
        assert!(contents.contains("$(shell utgen --dir .. get-source-file-paths"));
    }
}
