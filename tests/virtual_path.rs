use vpath_core::provider::ExtensionFilter;
use vpath_core::types::{CacheKey, ProviderId, VirtualPath, VirtualPathError};
use vpath_core::vfs::{decode_text, DecodeError};

#[test]
fn normalization_rules() {
    let cases = [
        ("/", "/"),
        ("/index.html", "/index.html"),
        ("//pages///home.html", "/pages/home.html"),
        ("/pages/./home.html", "/pages/home.html"),
        ("/pages/drafts/../home.html", "/pages/home.html"),
        ("\\pages\\home.html", "/pages/home.html"),
        ("/pages/", "/pages"),
    ];

    for (raw, expected) in cases {
        let path = VirtualPath::parse(raw).unwrap();
        assert_eq!(path.as_str(), expected, "normalizing {raw:?}");
    }
}

#[test]
fn rejected_paths() {
    assert_eq!(VirtualPath::parse(""), Err(VirtualPathError::Empty));
    assert_eq!(VirtualPath::parse("/a\0"), Err(VirtualPathError::NulByte));
    assert!(matches!(
        VirtualPath::parse("pages/home.html"),
        Err(VirtualPathError::NotRooted(_))
    ));
    assert!(matches!(
        VirtualPath::parse("/.."),
        Err(VirtualPathError::EscapesRoot(_))
    ));
}

#[test]
fn extension_rules() {
    let ext = |raw: &str| VirtualPath::parse(raw).unwrap().extension().map(str::to_string);

    assert_eq!(ext("/home.html").as_deref(), Some(".html"));
    assert_eq!(ext("/archive.tar.gz").as_deref(), Some(".gz"));
    assert_eq!(ext("/dir.d/readme"), None);
    assert_eq!(ext("/.profile"), None);
    assert_eq!(ext("/"), None);
}

#[test]
fn extension_filter_matches_suffix_only() {
    let filter = ExtensionFilter::new([".html", ".HTM"]);
    let accepts = |raw: &str| filter.accepts(&VirtualPath::parse(raw).unwrap());

    assert!(accepts("/a.html"));
    assert!(accepts("/a.HTML"));
    assert!(accepts("/a.htm"));
    assert!(!accepts("/a.html.bak"));
    assert!(!accepts("/html"));
    assert!(!accepts("/a.xhtml"));
}

#[test]
fn cache_key_layout() {
    let path = VirtualPath::parse("/pages/home.html").unwrap();

    let key = CacheKey::derive(ProviderId::STATIC_FILE, "mem-site", &path);

    assert_eq!(key.as_str(), "static_file_mem-site_/pages/home.html");
    assert_ne!(key, CacheKey::derive(ProviderId::STATIC_FILE, "mem-other", &path));
}

#[test]
fn decode_plain_and_bom_variants() {
    assert_eq!(decode_text(b"plain".to_vec()).unwrap(), "plain");
    assert_eq!(decode_text(b"\xEF\xBB\xBFbom".to_vec()).unwrap(), "bom");
    assert_eq!(decode_text(vec![0xFE, 0xFF, 0x00, 0x68, 0x00, 0x69]).unwrap(), "hi");
    assert_eq!(decode_text(vec![0xFF, 0xFE, 0x68, 0x00, 0x69, 0x00]).unwrap(), "hi");
}

#[test]
fn decode_failures() {
    assert!(matches!(
        decode_text(vec![0, 159, 146, 150]),
        Err(DecodeError::InvalidUtf8(_))
    ));
    assert!(matches!(
        decode_text(vec![0xFF, 0xFE, 0x68]),
        Err(DecodeError::TruncatedUtf16(1))
    ));
    assert!(matches!(
        decode_text(vec![0xFF, 0xFE, 0x00, 0xD8]),
        Err(DecodeError::InvalidUtf16(_))
    ));
}
