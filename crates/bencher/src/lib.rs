#[derive(Debug, Copy, Clone)]
pub struct TestCase {
    name: &'static str,
    group: TestGroup,
    file: TestFile,
}

impl TestCase {
    pub fn new(name: &'static str, group: TestGroup, file: TestFile) -> Self {
        Self { name, group, file }
    }

    pub fn small(name: &'static str, file: TestFile) -> Self {
        Self::new(name, TestGroup::Small, file)
    }

    pub fn normal(name: &'static str, file: TestFile) -> Self {
        Self::new(name, TestGroup::Normal, file)
    }

    pub fn large(name: &'static str, file: TestFile) -> Self {
        Self::new(name, TestGroup::Large, file)
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn group(&self) -> TestGroup {
        self.group
    }

    pub fn file(&self) -> &TestFile {
        &self.file
    }

    pub fn file_name(&self) -> &'static str {
        self.file().file_name
    }
}

#[derive(Debug, Copy, Clone)]
pub struct TestFile {
    file_name: &'static str,
    content: &'static str,
}

impl TestFile {
    pub const fn new(file_name: &'static str, content: &'static str) -> Self {
        Self { file_name, content }
    }

    pub fn content(&self) -> &'static str {
        self.content
    }

    pub fn file_name(&self) -> &'static str {
        self.file_name
    }
}

#[derive(Clone, Copy, Debug)]
pub enum TestGroup {
    Small,
    Normal,
    Large,
}

/// Request fixtures shared by the benches. Line endings are spelled out since the
/// parser requires CRLF.
pub mod fixtures {
    use crate::TestFile;

    pub static GET_SMALL: TestFile = TestFile::new("get_small", concat!(
        "GET /index.html HTTP/1.1\r\n",
        "Host: localhost\r\n",
        "\r\n",
    ));

    pub static GET_LARGE: TestFile = TestFile::new("get_large", concat!(
        "GET /api/v1/users/42/orders?page=3&per_page=50&sort=created_at&order=desc HTTP/1.1\r\n",
        "Host: shop.example.com\r\n",
        "User-Agent: Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0 Safari/537.36\r\n",
        "Accept: text/html,application/xhtml+xml,application/xml;q=0.9,image/avif,image/webp,*/*;q=0.8\r\n",
        "Accept-Language: en-US,en;q=0.9,de;q=0.8\r\n",
        "Accept-Encoding: gzip, deflate, br\r\n",
        "Cache-Control: max-age=0\r\n",
        "Cookie: session=3f2a9c1e7b; theme=dark; tz=Europe%2FBerlin\r\n",
        "Referer: https://shop.example.com/api/v1/users/42\r\n",
        "X-Forwarded-For: 203.0.113.7, 10.0.0.1\r\n",
        "X-Request-Id: 0d6f7c54-8a3e-4b2f-9d1c-5e6a7b8c9d0e\r\n",
        "Connection: keep-alive\r\n",
        "\r\n",
    ));

    pub static POST_FORM: TestFile = TestFile::new("post_form", concat!(
        "POST /login HTTP/1.1\r\n",
        "Host: localhost\r\n",
        "Content-Type: application/x-www-form-urlencoded\r\n",
        "Content-Length: 46\r\n",
        "\r\n",
        "user=alice&password=s%3Dcr%26t&remember=on&x=1",
    ));

    pub static POST_CHUNKED: TestFile = TestFile::new("post_chunked", concat!(
        "POST /upload HTTP/1.1\r\n",
        "Host: localhost\r\n",
        "Transfer-Encoding: chunked\r\n",
        "\r\n",
        "4\r\nWiki\r\n",
        "5\r\npedia\r\n",
        "e\r\n in\r\n\r\nchunks.\r\n",
        "0\r\n",
        "X-Checksum: 9\r\n",
        "\r\n",
    ));
}
