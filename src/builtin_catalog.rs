//! Catalogs compiled into the crate, keyed by name

pub const DEFAULT: &str = "\
# カラオケお題
$free 自由
$unconstrained 縛りなし

年代
\t90年代
\t2000年代
\t2010年代
\t2020年代
\t自由

ジャンル
\tJ-POP
\tアニソン
\tロック
\t自由

先頭文字
\tあ行
\tか行
\tさ行
\tた行
\tな行
\tは行
\tま行
\tや行
\tら行
\tわ行
\t自由

$special
\tタイトルが2文字
\tタイトルが3文字
\tタイトルが4文字
\tタイトルが5文字
\tタイトルに数字が含まれる
\tタイトルに記号が含まれる（&！？等）
\tアーティスト名が英語
\tタイトルが全部ひらがな
\tタイトルが全部カタカナ
\tひらがな・カタカナ・漢字すべて含む
\tタイトルに2つ以上の英単語を含む
\t曲名に動物を含む
\t曲名に色が含まれる
\tタイトルが漢字一文字
\t男性アーティストの曲
\t女性アーティストの曲
\tメンバー2人のグループの曲
\tメンバー3人のグループの曲
\tメンバー4人のグループの曲
\tメンバー5人のグループの曲
\tタイトルに「歌/詩/唄/うた」を含む
\tタイトルが「単語の単語」形式
\t自分の前回の曲からしりとり
\tシャウトする曲
\tお題自由設定 or 再抽選
\tDAMトップ50
\t履歴にある曲
";

pub const CATALOGS: &[(&str, &str)] = &[("default", DEFAULT)];
