// tests/detection.rs
//
// End-to-end runs of the detection pipeline over whole cart pages.
//
use cart_shame::classifier::classify_document;
use cart_shame::detector::{OverridePolicy, TotalDetector, find_by_text_proximity};
use cart_shame::sites::SiteOverrideRegistry;
use cart_shame::{PageSnapshot, Provenance, is_cart_page, parse_price};
use scraper::Html;

const GENERIC_CART: &str = r#"<!doctype html>
<html>
<head>
  <title>Shopping Cart | Example Outfitters</title>
</head>
<body>
  <header><a href="/">Example Outfitters</a> <span class="phone">1-800-555-0199</span></header>
  <ul class="line-items">
    <li><span class="name">Wool socks</span> <span class="price">$12.00</span></li>
    <li><span class="name">Rain shell</span> <span class="price">$149.00</span></li>
  </ul>
  <section class="cart-summary">
    <div class="summary-row"><span>Shipping</span><span>$0.00</span></div>
    <div class="summary-row total"><span>Total</span><span>$161.00</span></div>
  </section>
  <footer>&copy; 2026</footer>
</body>
</html>"#;

const AMAZON_CART: &str = r#"<html><head><title>Amazon.com Shopping Cart</title></head>
<body>
  <div id="sc-active-cart">
    <div class="sc-list-item"><span class="sc-product-price">$19.99</span></div>
    <div class="sc-list-item"><span class="sc-product-price">$5.49</span></div>
  </div>
  <div id="sc-buy-box">
    <span id="sc-subtotal-label-buybox">Subtotal (2 items):</span>
    <span id="sc-subtotal-amount-buybox"><span class="sc-price">$25.48</span></span>
  </div>
</body></html>"#;

const UNKNOWN_MARKUP: &str = r#"<html><head><title>Checkout</title></head>
<body>
  <div class="x1"><div class="x2">Tee</div><div class="x3">$18.00</div></div>
  <div class="x1"><div class="x2">Hoodie</div><div class="x3">$54.00</div></div>
  <table>
    <tr><td>Items</td><td><span>$72.00</span></td></tr>
    <tr><td>Tax</td><td><span>$5.76</span></td></tr>
    <tr><td>Order total</td><td><span>$77.76</span></td></tr>
  </table>
</body></html>"#;

#[test]
fn generic_cart_uses_the_summary_block() {
    let document = Html::parse_document(GENERIC_CART);
    assert!(classify_document("https://example-outfitters.test/cart", &document));

    let result = TotalDetector::default()
        .detect_cart_total("example-outfitters.test", &document)
        .expect("total found");
    assert_eq!(result.price, 161.0);
    assert_eq!(result.provenance, Provenance::Selector(".cart-summary .total".into()));
}

#[test]
fn amazon_locale_domain_goes_through_the_override() {
    let page = PageSnapshot::new("https://www.amazon.com/gp/cart/view.html", AMAZON_CART);
    let document = page.document();
    let host = page.site_name().unwrap();

    let result = TotalDetector::default()
        .detect_cart_total(&host, &document)
        .expect("total found");
    assert_eq!(result.price, 25.48);
    assert_eq!(result.provenance.to_string(), "amazon-override");
}

#[test]
fn exclusive_override_with_no_match_reports_nothing() {
    // Amazon host, but none of the Amazon selectors are present.
    let document = Html::parse_document(GENERIC_CART);
    let detector = TotalDetector::default();
    assert_eq!(detector.policy(), OverridePolicy::Exclusive);
    assert!(detector.detect_cart_total("amazon.com", &document).is_none());

    let permissive = TotalDetector::new(SiteOverrideRegistry::with_builtin())
        .with_policy(OverridePolicy::FallThrough);
    let result = permissive.detect_cart_total("amazon.com", &document).unwrap();
    assert_eq!(result.price, 161.0);
}

#[test]
fn unknown_markup_falls_back_to_text_proximity() {
    let document = Html::parse_document(UNKNOWN_MARKUP);

    let detector = TotalDetector::default();
    assert!(detector.find_by_selectors(&document).is_none());

    let result = detector.detect_cart_total("tiny.shop", &document).unwrap();
    assert_eq!(result.provenance, Provenance::TextProximity);
    assert_eq!(result.price, 77.76);
    assert_eq!(result.text(), "$77.76");
}

#[test]
fn text_proximity_returns_the_maximum() {
    let document = Html::parse_document(
        r#"<body><div>
             <span>total</span>
             <span>$12.00</span><span>$45.00</span><span>$8.00</span>
           </div></body>"#,
    );

    assert_eq!(find_by_text_proximity(&document).unwrap().price, 45.0);
}

#[test]
fn empty_cart_detects_nothing() {
    let document = Html::parse_document(
        r#"<html><head><title>Your Bag</title></head>
           <body><p>Your bag is empty. Continue shopping.</p></body></html>"#,
    );

    assert!(TotalDetector::default().detect_cart_total("shop.test", &document).is_none());
}

#[test]
fn classifier_and_parser_examples() {
    let none: &[&str] = &[];
    assert!(is_cart_page("https://shop.example.com/cart", "My Cart", none));
    assert!(!is_cart_page("https://shop.example.com/product/123", "Blue Shirt", none));

    assert_eq!(parse_price("$1,234.56"), Some(1234.56));
    assert_eq!(parse_price("USD 99.00"), Some(99.0));
    assert_eq!(parse_price("Total: 0"), None);
}
