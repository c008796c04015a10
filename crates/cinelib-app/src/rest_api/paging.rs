use cinelib_dal::PageRequest;
use garde::Validate;

#[derive(Debug, Clone, Validate, serde::Deserialize)]
#[garde(allow_unvalidated)]
pub struct Paging {
    #[garde(range(min = 1))]
    pub(crate) page: Option<u32>,
    #[garde(range(min = 1, max = 1000))]
    pub(crate) page_size: Option<u32>,
}

impl Paging {
    pub fn into_page_request(self, default_page_size: u32) -> PageRequest {
        PageRequest::new(
            self.page.unwrap_or(1),
            self.page_size.unwrap_or(default_page_size),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_fill_in() {
        let paging = Paging {
            page: None,
            page_size: None,
        };
        let request = paging.into_page_request(32);
        assert_eq!(request.page, 1);
        assert_eq!(request.page_size, 32);
        assert_eq!(request.offset(), 0);
    }

    #[test]
    fn explicit_page_wins() {
        let paging = Paging {
            page: Some(3),
            page_size: Some(10),
        };
        let request = paging.into_page_request(32);
        assert_eq!(request.page, 3);
        assert_eq!(request.offset(), 20);
        assert_eq!(request.limit(), 10);
    }

    #[test]
    fn pages_count_rounds_up() {
        let request = PageRequest::new(1, 32);
        assert_eq!(request.pages_for(0), 0);
        assert_eq!(request.pages_for(32), 1);
        assert_eq!(request.pages_for(65), 3);
    }
}
