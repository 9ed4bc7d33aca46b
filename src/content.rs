//! Static educational text for the page.

pub const PAGE_TITLE: &str = "Stock Picker Project";
pub const HERO_IMAGE: &str = "stock.jpg";
pub const LAYOUT_IMAGE: &str = "layout.png";
pub const LAYOUT_CAPTION: &str = "Dashboard Layout";

pub const SECTION_DASHBOARD_GUIDE: &str = "1. Navigating the stocks data dashboard";
pub const SECTION_KPIS: &str = "2. Understanding the main KPIs";
pub const SECTION_CATALOG: &str = "3. Stock names and abbreviations table";
pub const SECTION_DASHBOARD: &str = "4. Stock picker data dashboard";
pub const SECTION_FORECAST: &str = "5. Time series forecast graph";
pub const SECTION_REFERENCES: &str = "6. References";
pub const SECTION_AUTHORS: &str = "Authors";

pub const DASHBOARD_POINTS: [&str; 3] = [
    "the main KPIs for each stock",
    "daily stock prices",
    "a scrollable filter tab to see values denoting each stock.",
];

/// (term, definition) pairs.
pub const KPIS: [(&str, &str); 8] = [
    ("ASK PRICE", "the ask price is the minimum price that a seller is willing to take for a share of their stock or other security (Fernado, Scott, & Clarine, 2021)."),
    ("ASK SIZE", "the quantity of a security a market maker or investor is willing to sell at a specific price (Martin, 2022)."),
    ("BID PRICE", "the bid price is the maximum price that a buyer is willing to pay for a share of stock or other security (Fernado, Scott, & Clarine, 2021)."),
    ("BID SIZE", "the bid size is the quantity of a security a market maker or investor is willing to purchase at a specific price (Martin, 2022)."),
    ("LAST PRICE", "the last price represents the main quoted price for the security in question. It is usually the price of the last trade or the previous close price if the market has yet to open (Milton, 2022)."),
    ("SHARES MATCHED", "shares matched is defined as the Shares (or notional Shares, where relevant) acquired or to be acquired (as appropriate in the context) by a Participant pursuant to a Matching Award (Law Insider, 2023)."),
    ("SHARES ROUTED", "order routing is the process by which a buy or sell order in the stock market is placed (Online Tradin Academy, 2020)."),
    ("VOLUME", "volume is defined as the number of shares traded in a particular stock, index, or other investment over a specific time period (Fidelity, 2022)."),
];

pub const CATALOG_INTRO: &str = "Please find below a list of the S&P 500 stocks with their respective symbol and name (Stock Market MBA, 2023).";

pub const DASHBOARD_PLACEHOLDER: &str = "*[dashboard to be imported here]*";

pub const REFERENCES: [&str; 7] = [
    "Fernado, J., Scott, G., & Clarine, S. (2021, August 25). Bid and Ask Definition, How Prices Are Determined, and Example. Retrieved from Investopedia: https://www.investopedia.com/terms/b/bid-and-ask.asp",
    "Fidelity. (2022, October 28). What volume says about stocks. Retrieved from Fidelity: https://www.fidelity.com/viewpoints/active-investor/stock-volume",
    "Law Insider. (2023, January 24). Matched Shares definition. Retrieved from Law Insider: https://www.lawinsider.com/dictionary/matched-shares",
    "Martin, M. (2022, September 15). Bid Size vs. Ask Size in Options & Stocks Explained. Retrieved from Project Finance: https://www.projectfinance.com/bid-size-ask-size/",
    "Milton, A. (2022, March 30). Bid, Ask, and Last Prices Defined. Retrieved from The Balance: https://www.thebalancemoney.com/trading-definitions-of-bid-ask-and-last-market-prices-1031026",
    "Online Tradin Academy. (2020, January 16). ORDER ROUTING. Retrieved from Online Tradin Academy: https://www.tradingacademy.com/financial-education-center/order-routing.aspx",
    "Stock Market MBA. (2023, January 24). Stocks in the S&P 500 Index. Retrieved from Stock Market MBA: https://stockmarketmba.com/stocksinthesp500.php",
];

pub const AUTHORS: [&str; 4] = [
    "Jemma Russell",
    "Abdul-Hafiz Joarder",
    "Beatrice Acquah",
    "Essam Nakra",
];

pub fn dashboard_list() -> String {
    DASHBOARD_POINTS
        .iter()
        .enumerate()
        .map(|(i, p)| format!("{}. {}", i + 1, p))
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn kpi_glossary() -> String {
    KPIS.iter()
        .map(|(term, def)| format!("**{}**\n\n- {}", term, def))
        .collect::<Vec<_>>()
        .join("\n\n")
}

pub fn reference_list() -> String {
    REFERENCES
        .iter()
        .enumerate()
        .map(|(i, r)| format!("[{}] {}", i + 1, r))
        .collect::<Vec<_>>()
        .join("\n\n")
}

pub fn back_to_top() -> String {
    format!("[Back to Top](#{})", crate::toc::anchor_id(PAGE_TITLE))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn references_are_numbered() {
        let refs = reference_list();
        assert!(refs.starts_with("[1] Fernado"));
        assert!(refs.contains("[7] Stock Market MBA"));
    }

    #[test]
    fn back_to_top_targets_title_anchor() {
        assert_eq!(back_to_top(), "[Back to Top](#stock-picker-project)");
    }

    #[test]
    fn glossary_has_every_kpi() {
        let g = kpi_glossary();
        for (term, _) in KPIS {
            assert!(g.contains(&format!("**{}**", term)));
        }
    }
}
