//! Standard-library allowlists
//!
//! Names listed here are provided by the toolchain itself and never trigger
//! an install. For C and C++ these are also the only headers a program may
//! include.

/// Python standard-library top-level modules
pub const PYTHON: &[&str] = &[
    "__future__", "_thread", "abc", "aifc", "argparse", "array", "ast", "asynchat",
    "asyncio", "atexit", "audioop", "base64", "bdb", "binascii", "bisect", "builtins",
    "bz2", "calendar", "cgi", "cgitb", "chunk", "cmath", "cmd", "code", "codecs", "codeop",
    "collections", "colorsys", "compileall", "concurrent", "configparser", "contextlib",
    "contextvars", "copy", "copyreg", "cProfile", "crypt", "csv", "ctypes", "curses",
    "dataclasses", "datetime", "dbm", "decimal", "difflib", "dis", "doctest", "email",
    "ensurepip", "enum", "errno", "faulthandler", "fcntl", "filecmp", "fileinput",
    "fnmatch", "formatter", "fractions", "ftplib", "functools", "gc", "getopt", "getpass",
    "gettext", "glob", "graphlib", "grp", "gzip", "hashlib", "heapq", "hmac", "html",
    "http", "idlelib", "imaplib", "imghdr", "imp", "importlib", "inspect", "io",
    "ipaddress", "itertools", "json", "keyword", "lib2to3", "linecache", "locale",
    "logging", "lzma", "mailbox", "mailcap", "marshal", "math", "mimetypes", "mmap",
    "modulefinder", "msvcrt", "multiprocessing", "netrc", "nntplib", "ntpath", "numbers",
    "operator", "optparse", "os", "pathlib", "pdb", "pickle", "pipes", "pkgutil",
    "platform", "poplib", "posix", "posixpath", "pprint", "profile", "pstats", "pty", "pwd",
    "py_compile", "pyclbr", "pydoc", "queue", "quopri", "random", "re", "readline",
    "reprlib", "resource", "rlcompleter", "runpy", "sched", "secrets", "select",
    "selectors", "shelve", "shlex", "shutil", "signal", "site", "smtplib", "sndhdr",
    "socket", "socketserver", "spwd", "sqlite3", "ssl", "stat", "statistics", "string",
    "stringprep", "struct", "subprocess", "symtable", "sys", "sysconfig", "syslog",
    "tabnanny", "tarfile", "telnetlib", "tempfile", "termios", "textwrap", "threading",
    "time", "timeit", "tkinter", "token", "tokenize", "tomllib", "trace", "traceback",
    "tty", "turtle", "types", "typing", "unicodedata", "unittest", "urllib", "uu", "uuid",
    "venv", "warnings", "wave", "weakref", "webbrowser", "winreg", "winsound", "wsgiref",
    "xdrlib", "xml", "xmlrpc", "zipapp", "zipfile", "zipimport", "zlib", "zoneinfo",
];

/// Node.js built-in modules, without the `node:` prefix
pub const NODE: &[&str] = &[
    "assert", "async_hooks", "buffer", "child_process", "cluster", "console", "constants",
    "crypto", "dgram", "diagnostics_channel", "dns", "domain", "events", "fs", "http",
    "http2", "https", "inspector", "module", "net", "os", "path", "perf_hooks", "process",
    "punycode", "querystring", "readline", "repl", "stream", "string_decoder", "sys",
    "test", "timers", "tls", "trace_events", "tty", "url", "util", "v8", "vm", "wasi",
    "worker_threads", "zlib",
];

/// Java first package segments that never need fetching
pub const JAVA: &[&str] = &[
    "java", "javax", "jakarta", "javafx", "jdk", "sun", "com", "org", "net", "io",
];

/// C standard headers
pub const C_HEADERS: &[&str] = &[
    "assert.h", "complex.h", "ctype.h", "errno.h", "fenv.h", "float.h", "inttypes.h",
    "iso646.h", "limits.h", "locale.h", "math.h", "setjmp.h", "signal.h", "stdalign.h",
    "stdarg.h", "stdatomic.h", "stdbool.h", "stddef.h", "stdint.h", "stdio.h", "stdlib.h",
    "stdnoreturn.h", "string.h", "tgmath.h", "threads.h", "time.h", "uchar.h", "wchar.h",
    "wctype.h",
];

/// C++ standard headers, including the `<cxxx>` C compatibility forms.
/// The `<xxx.h>` forms are accepted through [`C_HEADERS`].
pub const CPP_HEADERS: &[&str] = &[
    "algorithm", "any", "array", "atomic", "barrier", "bit", "bitset", "cassert", "cctype",
    "cerrno", "cfenv", "cfloat", "charconv", "chrono", "cinttypes", "ciso646", "climits",
    "clocale", "cmath", "codecvt", "compare", "complex", "concepts", "condition_variable",
    "coroutine", "csetjmp", "csignal", "cstdalign", "cstdarg", "cstdbool", "cstddef",
    "cstdint", "cstdio", "cstdlib", "cstring", "ctgmath", "ctime", "cuchar", "cwchar",
    "cwctype", "deque", "exception", "execution", "filesystem", "format", "forward_list",
    "fstream", "functional", "future", "initializer_list", "iomanip", "ios", "iosfwd",
    "iostream", "istream", "iterator", "latch", "limits", "list", "locale", "map", "memory",
    "memory_resource", "mutex", "new", "numbers", "numeric", "optional", "ostream", "queue",
    "random", "ranges", "ratio", "regex", "scoped_allocator", "semaphore", "set",
    "shared_mutex", "source_location", "span", "sstream", "stack", "stdexcept",
    "stop_token", "streambuf", "string", "string_view", "strstream", "syncstream",
    "system_error", "thread", "tuple", "type_traits", "typeindex", "typeinfo",
    "unordered_map", "unordered_set", "utility", "valarray", "variant", "vector", "version",
];

pub fn is_python_stdlib(module: &str) -> bool {
    PYTHON.contains(&module)
}

pub fn is_node_builtin(module: &str) -> bool {
    NODE.contains(&module)
}

pub fn is_java_platform(segment: &str) -> bool {
    JAVA.contains(&segment)
}

pub fn is_c_header(header: &str) -> bool {
    C_HEADERS.contains(&header)
}

pub fn is_cpp_header(header: &str) -> bool {
    CPP_HEADERS.contains(&header) || C_HEADERS.contains(&header)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_python_set_size() {
        assert!(PYTHON.len() >= 100);
        assert!(is_python_stdlib("os"));
        assert!(!is_python_stdlib("numpy"));
    }

    #[test]
    fn test_headers_are_language_specific() {
        assert!(is_c_header("stdio.h"));
        assert!(!is_c_header("iostream"));
        assert!(is_cpp_header("vector"));
        assert!(!is_cpp_header("bits/stdc++.h"));
    }

    #[test]
    fn test_cpp_accepts_c_compatibility_headers() {
        for header in ["stdio.h", "math.h", "string.h", "cstdio", "cfenv", "cuchar", "version"] {
            assert!(is_cpp_header(header), "{} rejected", header);
        }
    }

    #[test]
    fn test_python_system_modules_are_stdlib() {
        for module in ["resource", "fileinput", "optparse", "pdb", "mmap", "xmlrpc", "tkinter"] {
            assert!(is_python_stdlib(module), "{} missing", module);
        }
    }

    #[test]
    fn test_lists_have_no_duplicates() {
        for list in [PYTHON, NODE, JAVA, C_HEADERS, CPP_HEADERS] {
            let mut sorted = list.to_vec();
            sorted.sort_unstable();
            sorted.dedup();
            assert_eq!(sorted.len(), list.len());
        }
    }
}
