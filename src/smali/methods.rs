use super::FormatError;
use crate::patch::Error;
use std::collections::hash_map::{HashMap, Values};
use std::collections::HashSet;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// Line that opens a method block
pub const METHOD_START: &str = ".method";

/// Line that closes a method block
pub const METHOD_END: &str = ".end method";

/// Debug line number directive (eg. `.line 1024`)
pub const LINE_DIRECTIVE: &str = ".line";

/// Is this line a `.line` directive?
///
/// Line numbers are disassembler noise as far as patching is concerned.
pub fn is_line_directive(line: &str) -> bool {
    line.trim().starts_with(LINE_DIRECTIVE)
}

/// Extract the method name from a `.method` line
///
/// The name is whatever sits between the first `(` and the closest space before it, so
/// `.method public final startActivity(Landroid/content/Intent;)I` yields `startActivity`.
pub fn find_method_name(line: &str) -> Result<&str, FormatError> {
    method_name_span(line)
        .map(|(start, end)| &line[start..end])
        .ok_or_else(|| FormatError::MissingMethodName(line.to_owned()))
}

/// Rewrite a `.method` line so that the method name gets `suffix` appended
///
/// Only the name itself is touched, so descriptors mentioning the same text are left alone.
pub fn rename_method(line: &str, suffix: &str) -> Result<String, FormatError> {
    let (_, end) =
        method_name_span(line).ok_or_else(|| FormatError::MissingMethodName(line.to_owned()))?;
    let mut renamed = String::with_capacity(line.len() + suffix.len());
    renamed.push_str(&line[..end]);
    renamed.push_str(suffix);
    renamed.push_str(&line[end..]);
    Ok(renamed)
}

fn method_name_span(line: &str) -> Option<(usize, usize)> {
    let end = line.find('(')?;
    let start = line[..end].rfind(' ')? + 1;
    Some((start, end))
}

/// Verbatim text of one method, from `.method` to `.end method` inclusive
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodBlock {
    /// First line of the block, without surrounding whitespace
    pub signature: String,

    /// Method name extracted from the signature
    pub name: String,

    /// Full block text, line terminators included but `.line` directives dropped
    pub body: String,
}

/// Method blocks of interest, keyed by signature
#[derive(Debug, Default)]
pub struct MethodIndex {
    blocks: HashMap<String, MethodBlock>,
}

impl MethodIndex {
    pub fn get(&self, signature: &str) -> Option<&MethodBlock> {
        self.blocks.get(signature)
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    pub fn blocks(&self) -> Values<'_, String, MethodBlock> {
        self.blocks.values()
    }
}

/// Single pass collector of method blocks whose names are in a target set
pub struct MethodIndexer<'a> {
    /// Names of methods worth keeping
    targets: &'a HashSet<String>,

    /// Block currently being accumulated
    current: Option<MethodBlock>,

    index: MethodIndex,
}

impl<'a> MethodIndexer<'a> {
    pub fn new(targets: &'a HashSet<String>) -> MethodIndexer<'a> {
        MethodIndexer {
            targets,
            current: None,
            index: MethodIndex::default(),
        }
    }

    /// Index the methods of a file on disk
    pub fn index_file<P: AsRef<Path>>(
        path: P,
        targets: &'a HashSet<String>,
    ) -> Result<MethodIndex, Error> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(Error::MissingFile(path.to_owned()));
        }
        log::debug!("Indexing methods of {:?}", path);
        let reader = BufReader::new(File::open(path)?);
        MethodIndexer::new(targets).index_reader(reader)
    }

    /// Index the methods of any line oriented source
    pub fn index_reader<R: BufRead>(mut self, mut reader: R) -> Result<MethodIndex, Error> {
        let mut line = String::new();
        loop {
            line.clear();
            if reader.read_line(&mut line)? == 0 {
                break;
            }
            self.visit_line(&line)?;
        }
        Ok(self.finish())
    }

    /// Feed the next line (including its terminator) to the indexer
    pub fn visit_line(&mut self, line: &str) -> Result<(), FormatError> {
        if line.starts_with(METHOD_START) {
            let signature = line.trim();
            self.current = Some(MethodBlock {
                signature: signature.to_owned(),
                name: find_method_name(signature)?.to_owned(),
                body: line.to_owned(),
            });
        } else if line.starts_with(METHOD_END) {
            if let Some(mut block) = self.current.take() {
                block.body.push_str(line);
                if self.targets.contains(&block.name) {
                    log::trace!("Indexed {}", block.signature);
                    self.index.blocks.insert(block.signature.clone(), block);
                }
            }
        } else if is_line_directive(line) {
            // not part of the recorded body
        } else if let Some(block) = self.current.as_mut() {
            block.body.push_str(line);
        }
        Ok(())
    }

    pub fn finish(self) -> MethodIndex {
        log::debug!("Indexed {} method(s)", self.index.len());
        self.index
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn targets(names: &[&str]) -> HashSet<String> {
        names.iter().copied().map(String::from).collect()
    }

    fn index(source: &str, names: &[&str]) -> MethodIndex {
        let names = targets(names);
        MethodIndexer::new(&names).index_reader(source.as_bytes()).unwrap()
    }

    #[test]
    fn method_names() {
        assert_eq!(find_method_name(".method public foo(I)V"), Ok("foo"));
        assert_eq!(
            find_method_name(".method private final startProcessLocked(Ljava/lang/String;)V"),
            Ok("startProcessLocked")
        );
        assert_eq!(find_method_name(".method static constructor <clinit>()V"), Ok("<clinit>"));
        assert!(find_method_name(".method public foo").is_err());
        assert!(find_method_name("foo(I)V").is_err());
    }

    #[test]
    fn renaming() {
        assert_eq!(
            rename_method(".method public foo(Lfoo;)V\n", "$Pr").unwrap(),
            ".method public foo$Pr(Lfoo;)V\n"
        );
        assert!(rename_method(".field foo:I", "$Pr").is_err());
    }

    #[test]
    fn indexes_wanted_methods() {
        let source = "\
.class public LFoo;
.super Ljava/lang/Object;

.method public foo(I)V
    .registers 2
    .line 12
    return-void
.end method

.method public bar()V
    .registers 1
    return-void
.end method
";
        let methods = index(source, &["foo"]);
        assert_eq!(methods.len(), 1);

        let block = methods.get(".method public foo(I)V").unwrap();
        assert_eq!(block.name, "foo");
        assert!(block.body.starts_with(".method public foo(I)V"));
        assert!(block.body.ends_with(".end method\n"));
        assert_eq!(
            block.body,
            ".method public foo(I)V\n    .registers 2\n    return-void\n.end method\n"
        );
        assert!(methods.get(".method public bar()V").is_none());
    }

    #[test]
    fn overloads_are_separate_entries() {
        let source = "\
.method public foo(I)V
    return-void
.end method
.method public foo(J)V
    return-void
.end method
";
        let methods = index(source, &["foo"]);
        assert_eq!(methods.len(), 2);
        assert!(methods.blocks().all(|block| block.name == "foo"));
    }

    #[test]
    fn no_targets() {
        let source = ".method public foo(I)V\n    return-void\n.end method\n";
        assert!(index(source, &[]).is_empty());
    }

    #[test]
    fn malformed_signature() {
        let names = targets(&["foo"]);
        let result = MethodIndexer::new(&names)
            .index_reader(".method public broken\n.end method\n".as_bytes());
        assert!(matches!(
            result,
            Err(Error::Format(FormatError::MissingMethodName(_)))
        ));
    }
}
