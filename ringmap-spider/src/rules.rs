//! Static rule tables driving friend-link discovery. Loaded once, never
//! mutated at runtime.

/// Anchor labels that name a friends directory. Mixed languages on purpose;
/// the ring has members writing in several of them.
pub const FRIEND_LABEL_KEYWORDS: &[&str] = &[
    "友情",
    "friend",
    "友链",
    "友人",
    "朋友",
    "左邻右舍",
    "友邻",
];

/// Longest anchor label still treated as a navigation entry rather than prose.
pub const FRIEND_LABEL_MAX_LEN: usize = 10;

/// Path substrings that identify a friends directory URL. Ordered by
/// confidence; checked after stripping a trailing `.html` and `/`.
pub const FRIEND_PATH_KEYWORDS: &[&str] = &[
    "/link",
    "/friend",
    "/links",
    "/friends",
    "/%e5%8f%8b%e4%ba%ba%e5%b8%90", // /友人帐
];

/// Labels of "continue into the blog" landing-page links.
pub const HOMEPAGE_CONTINUE_KEYWORDS: &[&str] = &["博客", "blog"];

/// Containers likely to hold the friend-link list, most specific first. The
/// first selector that yields an accepted link wins exclusively.
pub const FRIEND_BOX_SELECTORS: &[&str] = &[
    r#"*[itemprop="articleBody"]"#, // https://schema.org/Article
    ".link-box",
    ".post-body", // theme-next
    ".post-content",
    ".post",
    ".content",
    "article",
    ".article-container", // hexo-theme-butterfly
    "main",
    ".main-wrapper",
    ".main-content", // halo-theme-dream
    "body",          // fallback
];

/// Hosts never counted as friend links: ring infrastructure, social
/// platforms, avatar CDNs, and the usual footer-badge destinations.
pub const FRIEND_DENY_HOSTS: &[&str] = &[
    "travellings.link",
    "travellings.cn",
    "gov.moe",
    "travel.moe",
    "gov.cn",
    "foreverblog.cn",
    "aliyun.com",
    "github.com",
    "twitter.com",
    "telegram.me",
    "t.me",
    "typecho.org",
    "creativecommons.org",
    "weibo.com",
    "gitee.io",
    "qlogo.cn",
    "gravatar.com",
    "cravatar.cn",
    "hexo.io",
    "bilibili.com",
    "zhihu.com",
    "qq.com",
    "langchain.com",
    "youtube.com",
];

/// Path prefixes of avatar endpoints that show up inside link lists.
pub const AVATAR_PATH_PREFIXES: &[&str] = &["/avatar", "/gravatar"];

/// Image extensions filtered out of candidate link URLs.
pub const IMAGE_EXTENSIONS: &[&str] = &[".jpg", ".png", ".gif", ".jpeg", ".webp", ".svg"];

/// Byte signature of the Mix Space client bundle. Pages serving it expose a
/// JSON links API instead of a crawlable list.
pub const MIX_SPACE_SIGNATURE: &[u8] = b"%c Mix Space %c https://github.com/mx-space";

/// Patterns that locate the Mix Space API base inside a page body, tried in
/// order until one captures a non-empty match.
pub const MIX_SPACE_API_PATTERNS: &[&str] = &[
    r#""NEXT_PUBLIC_API_URL"\s*:\s*"([^"]*)""#,
    r#"\\"NEXT_PUBLIC_API_URL\\"\s*:\s*\\"([^"]*)\\""#,
    r#"<meta\s+name="api_url"\s+content="([^"]*)"/?\s*>"#,
];

/// Selector tag recorded on links that came from the Mix Space API rather
/// than a page container.
pub const MIX_SPACE_SELECTOR: &str = "::mix_space";

/// Quoted absolute URLs inside inline script text. Some themes render their
/// link list client-side in randomized order.
pub const SCRIPT_URL_PATTERN: &str = concat!(
    r#""https?://[-A-Za-z0-9+&@#/%?=~_|!:,.;]+[-A-Za-z0-9+&@#/%=~_|]""#,
    "|",
    r#"'https?://[-A-Za-z0-9+&@#/%?=~_|!:,.;]+[-A-Za-z0-9+&@#/%=~_|]'"#,
);
