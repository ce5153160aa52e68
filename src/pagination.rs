/// page arithmetic for a list of `count` items shown `per_page` at a time.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Paginator {
    count: i64,
    per_page: i64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Page {
    pub number: i64,
    pub num_pages: i64,
    pub count: i64,
    pub per_page: i64,
}

impl Paginator {
    pub fn new(count: i64, per_page: i64) -> Self {
        Self {
            count: count.max(0),
            per_page: per_page.max(1),
        }
    }

    /// an empty list still has one (empty) page.
    pub fn num_pages(&self) -> i64 {
        ((self.count + self.per_page - 1) / self.per_page).max(1)
    }

    /// resolves a raw `?page=` value. missing or non-numeric values give the
    /// first page, numbers outside `1..=num_pages` give the last page.
    pub fn page(&self, raw: Option<&str>) -> Page {
        let num_pages = self.num_pages();

        let number = match raw.map(str::trim).map(str::parse::<i64>) {
            Some(Ok(n)) if (1..=num_pages).contains(&n) => n,
            Some(Ok(_)) => num_pages,
            Some(Err(_)) | None => 1,
        };

        Page {
            number,
            num_pages,
            count: self.count,
            per_page: self.per_page,
        }
    }
}

impl Page {
    pub fn offset(&self) -> i64 {
        (self.number - 1) * self.per_page
    }

    pub fn limit(&self) -> i64 {
        self.per_page
    }

    pub fn has_previous(&self) -> bool {
        self.number > 1
    }

    pub fn has_next(&self) -> bool {
        self.number < self.num_pages
    }

    /// 1-based position of the first item on this page.
    pub fn start_index(&self) -> i64 {
        if self.count == 0 {
            return 0;
        }

        self.offset() + 1
    }
}
